use percent_encoding::percent_decode_str;
use regex::Regex;
use thiserror::Error;

/// Scheme prefix of a connection address.
const SCHEME: &str = "gsheet://";

/// One document clause: `doc=(id=<ID>,range=<SHEET>!<CELL>:<CELL>)`. The sheet
/// name may not contain `/`, `!` or `,`; commas inside a sheet name have to be
/// percent-encoded.
const DOCUMENT_PATTERN: &str =
    r"doc=\(id=([A-Za-z0-9_-]+),range=([^/!,]+![A-Za-z]+[0-9]+:[A-Za-z]+[0-9]+)\)";

/// Errors related to connection-address parsing.
#[derive(Error, Debug)]
pub enum AddressError {
    #[error("Invalid connection address '{0}'")]
    Malformed(String),
}

/// Identifies one document, range, and target schema to publish. Serves as
/// the deduplication and revision-cache key; immutable once parsed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Document {
    /// Remote document id
    pub id: String,
    /// Percent-decoded range, e.g. `MySheet!A1:G6`
    pub range: String,
    /// Target schema shared by every document of the address
    pub schema: String,
}

/// A parsed connection address: the documents to publish, in first-seen order
/// with exact duplicates collapsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    pub documents: Vec<Document>,
}

impl Address {
    /// Cheap scheme check, usable before a full parse.
    pub fn accepts(input: &str) -> bool {
        input.starts_with(SCHEME)
    }
}

impl TryFrom<&str> for Address {
    type Error = AddressError;

    /// Parses a connection address of the form
    /// `gsheet://doc=(id=<ID>,range=<RANGE>)[,doc=(...)]*/<SCHEMA>`.
    ///
    /// The whole input must match the grammar; ranges are percent-decoded
    /// after matching. Parsing performs no I/O.
    fn try_from(input: &str) -> Result<Self, Self::Error> {
        let pattern = Regex::new(&format!(
            "^{SCHEME}{DOCUMENT_PATTERN}((?:,{DOCUMENT_PATTERN})*)/([A-Za-z][A-Za-z0-9_]*)$"
        ))
        .expect("Hardcode regex pattern");
        let captures = pattern
            .captures(input)
            .ok_or_else(|| AddressError::Malformed(input.to_owned()))?;

        // Group layout: 1/2 first clause, 3 remaining clauses, 6 schema name.
        let schema = captures[6].to_owned();
        let mut documents = Vec::new();
        append(&mut documents, &captures[1], &captures[2], &schema, input)?;

        let clause = Regex::new(&format!(",{DOCUMENT_PATTERN}")).expect("Hardcode regex pattern");
        for extra in clause.captures_iter(captures.get(3).map_or("", |group| group.as_str())) {
            append(&mut documents, &extra[1], &extra[2], &schema, input)?;
        }

        Ok(Address { documents })
    }
}

/// Decodes the range and appends the document unless an identical one was
/// already seen.
fn append(
    documents: &mut Vec<Document>,
    id: &str,
    range: &str,
    schema: &str,
    input: &str,
) -> Result<(), AddressError> {
    let range = percent_decode_str(range)
        .decode_utf8()
        .map_err(|_| AddressError::Malformed(input.to_owned()))?
        .into_owned();
    let document = Document {
        id: id.to_owned(),
        range,
        schema: schema.to_owned(),
    };
    if !documents.contains(&document) {
        documents.push(document);
    }
    Ok(())
}
