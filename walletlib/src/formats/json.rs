//! JSON-снимок леджера: `{"payouts": [...], "withdrawals": [...]}`.

use crate::{error::Result, model::Ledger};
use std::io::{BufRead, Write};

pub struct Json;

impl crate::traits::ReadFormat for Json {
    fn read<R: BufRead>(r: R) -> Result<Ledger> {
        Ok(serde_json::from_reader(r)?)
    }
}

impl crate::traits::WriteFormat for Json {
    fn write<W: Write>(mut w: W, ledger: &Ledger) -> Result<()> {
        serde_json::to_writer_pretty(&mut w, ledger)?;
        w.write_all(b"\n")?;
        Ok(())
    }
}
