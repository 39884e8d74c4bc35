//! BCS encoding of transaction data.
//!
//! BCS is little-endian, length prefixes are ULEB128, enum variants are
//! ULEB128 indices, and fixed-size arrays carry no prefix. Digests are the
//! exception: they serialize as byte vectors and therefore carry a length
//! prefix (`0x20`).
//!
//! Only the subset of `TransactionData` this service submits is encoded:
//! version 1, programmable transaction kind, no expiration.

use seeds_types::{Address, ObjectRef};

use crate::error::LedgerError;
use crate::transaction::{Argument, CallArg, Command, ObjectInput, ProgrammableTransaction};

/// Gas payment for a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GasData {
    pub payment: Vec<ObjectRef>,
    pub owner: Address,
    pub price: u64,
    pub budget: u64,
}

/// A complete unsigned transaction, ready to encode and sign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionData {
    pub kind: ProgrammableTransaction,
    pub sender: Address,
    pub gas: GasData,
}

impl TransactionData {
    /// Encode to BCS. Fails if any object input is still unresolved.
    pub fn to_bcs(&self) -> Result<Vec<u8>, LedgerError> {
        let mut w = BcsWriter::default();
        w.variant(0); // TransactionData::V1
        w.variant(0); // TransactionKind::ProgrammableTransaction
        write_programmable(&mut w, &self.kind)?;
        w.fixed(self.sender.as_bytes());
        w.len(self.gas.payment.len());
        for r in &self.gas.payment {
            write_object_ref(&mut w, r);
        }
        w.fixed(self.gas.owner.as_bytes());
        w.u64(self.gas.price);
        w.u64(self.gas.budget);
        w.variant(0); // TransactionExpiration::None
        Ok(w.into_bytes())
    }
}

#[derive(Default)]
struct BcsWriter {
    buf: Vec<u8>,
}

impl BcsWriter {
    fn uleb128(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buf.push(byte);
                return;
            }
            self.buf.push(byte | 0x80);
        }
    }

    fn len(&mut self, n: usize) {
        self.uleb128(n as u64);
    }

    fn variant(&mut self, index: u32) {
        self.uleb128(index as u64);
    }

    fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn bool(&mut self, v: bool) {
        self.buf.push(v as u8);
    }

    fn fixed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn bytes(&mut self, bytes: &[u8]) {
        self.len(bytes.len());
        self.buf.extend_from_slice(bytes);
    }

    fn string(&mut self, s: &str) {
        self.bytes(s.as_bytes());
    }

    fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

fn write_object_ref(w: &mut BcsWriter, r: &ObjectRef) {
    w.fixed(r.object_id.as_bytes());
    w.u64(r.version);
    w.bytes(r.digest.as_bytes());
}

fn write_programmable(w: &mut BcsWriter, tx: &ProgrammableTransaction) -> Result<(), LedgerError> {
    w.len(tx.inputs.len());
    for input in &tx.inputs {
        write_call_arg(w, input)?;
    }
    w.len(tx.commands.len());
    for command in &tx.commands {
        write_command(w, command);
    }
    Ok(())
}

fn write_call_arg(w: &mut BcsWriter, arg: &CallArg) -> Result<(), LedgerError> {
    match arg {
        CallArg::Pure(bytes) => {
            w.variant(0);
            w.bytes(bytes);
        }
        CallArg::Object(ObjectInput::Owned(r)) => {
            w.variant(1);
            w.variant(0); // ObjectArg::ImmOrOwnedObject
            write_object_ref(w, r);
        }
        CallArg::Object(ObjectInput::Shared {
            id,
            initial_shared_version,
            mutable,
        }) => {
            w.variant(1);
            w.variant(1); // ObjectArg::SharedObject
            w.fixed(id.as_bytes());
            w.u64(*initial_shared_version);
            w.bool(*mutable);
        }
        CallArg::Object(ObjectInput::ById(id)) => return Err(LedgerError::UnresolvedObject(*id)),
    }
    Ok(())
}

fn write_command(w: &mut BcsWriter, command: &Command) {
    match command {
        Command::MoveCall(call) => {
            w.variant(0);
            w.fixed(call.package.as_bytes());
            w.string(&call.module);
            w.string(&call.function);
            w.len(0); // type arguments
            write_arguments(w, &call.arguments);
        }
        Command::TransferObjects(objects, recipient) => {
            w.variant(1);
            write_arguments(w, objects);
            write_argument(w, recipient);
        }
        Command::SplitCoins(coin, amounts) => {
            w.variant(2);
            write_argument(w, coin);
            write_arguments(w, amounts);
        }
        Command::MergeCoins(target, sources) => {
            w.variant(3);
            write_argument(w, target);
            write_arguments(w, sources);
        }
    }
}

fn write_arguments(w: &mut BcsWriter, args: &[Argument]) {
    w.len(args.len());
    for arg in args {
        write_argument(w, arg);
    }
}

fn write_argument(w: &mut BcsWriter, arg: &Argument) {
    match arg {
        Argument::GasCoin => w.variant(0),
        Argument::Input(i) => {
            w.variant(1);
            w.u16(*i);
        }
        Argument::Result(i) => {
            w.variant(2);
            w.u16(*i);
        }
        Argument::NestedResult(i, j) => {
            w.variant(3);
            w.u16(*i);
            w.u16(*j);
        }
    }
}
