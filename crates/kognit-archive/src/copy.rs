use std::io::{self, Read, Write};

/// Which side of a payload copy failed.
#[derive(Debug)]
pub(crate) enum CopyError {
    Read(io::Error),
    Write(io::Error),
}

/// Stream `reader` into `writer` and return the number of bytes moved.
///
/// Unlike `io::copy` the failing side is reported, so a damaged archive can be
/// told apart from a full disk.
pub(crate) fn copy_payload<R, W>(reader: &mut R, writer: &mut W) -> Result<u64, CopyError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buffer = [0u8; 8192];
    let mut copied = 0u64;

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };
        writer.write_all(&buffer[..n]).map_err(CopyError::Write)?;
        copied += n as u64;
    }

    Ok(copied)
}
