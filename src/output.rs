use std::io::Write;

use serde_json::Value;

use crate::error::CliError;

/// Serialize `value` and write it to the writer followed by a newline.
///
/// Pretty-printed by default; `compact` emits a single line so that paged
/// output can be piped into line-oriented tools.
pub fn write_json<W: Write>(value: &Value, compact: bool, writer: &mut W) -> Result<(), CliError> {
    if compact {
        serde_json::to_writer(&mut *writer, value)?;
    } else {
        serde_json::to_writer_pretty(&mut *writer, value)?;
    }
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
