//! Programmable transactions: an ordered list of inputs and commands the
//! ledger executes atomically.
//!
//! Commands refer to inputs and to earlier commands' results through
//! [`Argument`]s. [`ProgrammableTransactionBuilder`] hands those out so callers
//! never compute indices by hand.

use seeds_types::{Address, ObjectId, ObjectRef};

/// A value a command operates on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Argument {
    /// The coin paying for gas.
    GasCoin,
    /// The input at this index.
    Input(u16),
    /// The single result of the command at this index.
    Result(u16),
    /// One element of a multi-value command result.
    NestedResult(u16, u16),
}

/// How an object input is supplied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObjectInput {
    /// An owned or immutable object at an exact version.
    Owned(ObjectRef),
    /// A shared object. `mutable` requests write access.
    Shared {
        id: ObjectId,
        initial_shared_version: u64,
        mutable: bool,
    },
    /// Known only by id; the ledger client resolves it before encoding.
    ById(ObjectId),
}

impl ObjectInput {
    pub fn id(&self) -> ObjectId {
        match self {
            Self::Owned(r) => r.object_id,
            Self::Shared { id, .. } | Self::ById(id) => *id,
        }
    }
}

/// A transaction input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallArg {
    /// A BCS-encoded plain value.
    Pure(Vec<u8>),
    Object(ObjectInput),
}

/// A call into a published Move function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveCall {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    pub arguments: Vec<Argument>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    MoveCall(Box<MoveCall>),
    /// Send the objects to the address argument.
    TransferObjects(Vec<Argument>, Argument),
    /// Split the listed amounts off a coin, one new coin per amount.
    SplitCoins(Argument, Vec<Argument>),
    /// Merge the listed coins into the first one.
    MergeCoins(Argument, Vec<Argument>),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgrammableTransaction {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

impl ProgrammableTransaction {
    /// Ids of every object input, in input order.
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.inputs
            .iter()
            .filter_map(|arg| match arg {
                CallArg::Object(obj) => Some(obj.id()),
                CallArg::Pure(_) => None,
            })
            .collect()
    }
}

/// Incrementally assembles a [`ProgrammableTransaction`].
#[derive(Debug, Default)]
pub struct ProgrammableTransactionBuilder {
    inputs: Vec<CallArg>,
    commands: Vec<Command>,
}

impl ProgrammableTransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn input(&mut self, arg: CallArg) -> Argument {
        self.inputs.push(arg);
        Argument::Input((self.inputs.len() - 1) as u16)
    }

    fn command(&mut self, command: Command) -> u16 {
        self.commands.push(command);
        (self.commands.len() - 1) as u16
    }

    pub fn pure_u64(&mut self, value: u64) -> Argument {
        self.input(CallArg::Pure(value.to_le_bytes().to_vec()))
    }

    pub fn pure_address(&mut self, address: Address) -> Argument {
        self.input(CallArg::Pure(address.as_bytes().to_vec()))
    }

    pub fn object(&mut self, object: ObjectInput) -> Argument {
        self.input(CallArg::Object(object))
    }

    /// Split one coin per amount off `coin`; returns the new coins in order.
    pub fn split_coins(&mut self, coin: Argument, amounts: Vec<Argument>) -> Vec<Argument> {
        let count = amounts.len() as u16;
        let idx = self.command(Command::SplitCoins(coin, amounts));
        (0..count).map(|i| Argument::NestedResult(idx, i)).collect()
    }

    pub fn merge_coins(&mut self, target: Argument, sources: Vec<Argument>) {
        self.command(Command::MergeCoins(target, sources));
    }

    pub fn transfer_objects(&mut self, objects: Vec<Argument>, recipient: Argument) {
        self.command(Command::TransferObjects(objects, recipient));
    }

    pub fn move_call(
        &mut self,
        package: ObjectId,
        module: impl Into<String>,
        function: impl Into<String>,
        arguments: Vec<Argument>,
    ) -> Argument {
        let idx = self.command(Command::MoveCall(Box::new(MoveCall {
            package,
            module: module.into(),
            function: function.into(),
            arguments,
        })));
        Argument::Result(idx)
    }

    pub fn finish(self) -> ProgrammableTransaction {
        ProgrammableTransaction {
            inputs: self.inputs,
            commands: self.commands,
        }
    }
}
