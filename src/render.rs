use std::io::{self, Write};

/// Printable bytes are 0x20 (space) through 0x7E (`~`).
pub fn is_printable(b: u8) -> bool {
    b == b' ' || b.is_ascii_graphic()
}

/// Writes `data` as text: printable bytes as themselves, everything else as
/// `<xx>` in lowercase hex.
pub fn write_escaped<W: Write>(out: &mut W, data: &[u8]) -> io::Result<()> {
    let mut run = 0;
    for (i, &b) in data.iter().enumerate() {
        if is_printable(b) {
            continue;
        }
        out.write_all(&data[run..i])?;
        write!(out, "<{:02x}>", b)?;
        run = i + 1;
    }
    out.write_all(&data[run..])
}
