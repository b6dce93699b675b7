use std::io::Read;
use std::pin::Pin;

use futures::stream::{self, Stream};
use serde::Deserialize;

use crate::domain::traits::CommandStream;
use crate::domain::{Command, CommandKind, Error, Money};

pub struct CsvReader<R: Read> {
    reader: Option<csv::Reader<R>>,
}

impl<R: Read> CsvReader<R> {
    pub fn new(reader: R) -> Result<Self, Error> {
        let rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        Ok(Self { reader: Some(rdr) })
    }
}

/// Internal shape used only for CSV deserialization.
#[derive(Debug, Deserialize)]
struct CsvRow {
    op: String,
    actor: u64,
    deal: Option<String>,
    amount: Option<Money>,
    description: Option<String>,
    secret: Option<String>,
}

fn deal_ref(op: &str, deal: Option<String>) -> Result<String, Error> {
    deal.ok_or_else(|| Error::Ingestion(format!("{} requires a deal reference", op)))
}

impl TryFrom<CsvRow> for Command {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self, Self::Error> {
        let op = row.op.trim().to_ascii_lowercase();
        let kind = match (op.as_str(), row.amount) {
            ("credit", Some(amount)) => CommandKind::Credit {
                amount,
                secret: row.secret.unwrap_or_default(),
            },
            ("open", Some(amount)) => CommandKind::Open {
                amount,
                description: row.description.unwrap_or_default(),
                label: row.deal,
            },
            ("accept", None) => CommandKind::Accept {
                deal: deal_ref(&op, row.deal)?,
            },
            ("cancel", None) => CommandKind::Cancel {
                deal: deal_ref(&op, row.deal)?,
            },
            ("complete", None) => CommandKind::Complete {
                deal: deal_ref(&op, row.deal)?,
            },
            (other, _) => {
                return Err(Error::Ingestion(format!("invalid operation: {}", other)));
            }
        };

        Ok(Command {
            kind,
            actor: row.actor,
        })
    }
}

impl<R: Read + Send + 'static> CommandStream for CsvReader<R> {
    type Commands = Pin<Box<dyn Stream<Item = Result<Command, Error>> + Send>>;

    fn stream(&mut self) -> Self::Commands {
        // Take ownership of the reader so the iterator we build owns all data and is 'static.
        let reader = match self.reader.take() {
            Some(r) => r,
            None => {
                // Already consumed; return an empty stream.
                return Box::pin(stream::iter(Vec::<Result<Command, Error>>::new()));
            }
        };

        // into_deserialize consumes the reader and returns an owning iterator
        let iter = reader
            .into_deserialize::<CsvRow>()
            .map(|row_res| match row_res {
                Ok(row) => Command::try_from(row),
                Err(e) => Err(Error::Ingestion(format!(
                    "CSV deserialization error: {}",
                    e
                ))),
            });

        Box::pin(stream::iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::CsvRow;
    use crate::domain::{Command, CommandKind, Error, Money};

    fn row(op: &str, deal: Option<&str>, amount: Option<&str>) -> CsvRow {
        CsvRow {
            op: op.to_owned(),
            actor: 1,
            deal: deal.map(str::to_owned),
            amount: amount.map(|a| Money::from_decimal_str(a).unwrap()),
            description: Some("stuff".to_owned()),
            secret: Some("sesame".to_owned()),
        }
    }

    #[test]
    fn maps_rows_to_commands() {
        let cmd = Command::try_from(row("open", Some("d1"), Some("10"))).unwrap();
        assert!(matches!(cmd.kind, CommandKind::Open { .. }));

        let cmd = Command::try_from(row("Accept", Some("d1"), None)).unwrap();
        assert!(matches!(cmd.kind, CommandKind::Accept { .. }));

        let cmd = Command::try_from(row("credit", None, Some("10"))).unwrap();
        assert!(matches!(cmd.kind, CommandKind::Credit { .. }));
    }

    #[test]
    fn rejects_unknown_and_malformed_rows() {
        assert!(matches!(
            Command::try_from(row("chargeback", None, Some("10"))),
            Err(Error::Ingestion(_))
        ));
        // accept without a deal reference
        assert!(matches!(
            Command::try_from(row("accept", None, None)),
            Err(Error::Ingestion(_))
        ));
        // open without an amount falls through to the invalid arm
        assert!(matches!(
            Command::try_from(row("open", Some("d1"), None)),
            Err(Error::Ingestion(_))
        ));
    }
}
