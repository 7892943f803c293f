//! Parser for lifepo4wered-cli output.
//!
//! Every line of `lifepo4wered-cli get` looks like `VBAT = 3327`: a name
//! token, a literal `=`, and a base-10 integer, whitespace-separated.

use crate::error::PollError;

/// One variable reading from the tool's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub name: String,
    pub value: i64,
}

/// Parse one output line into a sample.
///
/// Anything that does not scan as `<name> = <integer>` is an error, not a
/// line to skip.
pub fn parse_line(line: &str) -> Result<Sample, PollError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 || fields[1] != "=" {
        return Err(PollError::MalformedLine(line.to_string()));
    }
    let value: i64 = fields[2]
        .parse()
        .map_err(|_| PollError::MalformedLine(line.to_string()))?;

    Ok(Sample {
        name: fields[0].to_string(),
        value,
    })
}
