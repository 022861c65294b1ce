//! Minimal RFC 4180 writer.

/// Builds CSV text row by row with CRLF line endings.
#[derive(Debug, Default)]
pub struct CsvWriter {
    buffer: String,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one row.
    pub fn write_record<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                self.buffer.push(',');
            }
            push_field(&mut self.buffer, field.as_ref());
        }
        self.buffer.push_str("\r\n");
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}

fn push_field(buffer: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        buffer.push('"');
        buffer.push_str(&field.replace('"', "\"\""));
        buffer.push('"');
    } else {
        buffer.push_str(field);
    }
}
