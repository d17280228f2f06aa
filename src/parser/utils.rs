use std::io;

pub(crate) const BUFSIZE: usize = 64 * 1024;

/// Remove a final '\r' from a byte slice
#[inline]
pub(crate) fn trim_cr(line: &[u8]) -> &[u8] {
    if let Some((&b'\r', remaining)) = line.split_last() {
        remaining
    } else {
        line
    }
}

/// Standard buffer policy: buffer size
/// doubles until it reaches 8 MiB. Above, it will
/// increase in steps of 8 MiB. Nanopore reads can be
/// megabases long so the buffer is not capped.
pub(crate) fn grow_to(current_size: usize) -> usize {
    if current_size < 1 << 23 {
        current_size * 2
    } else {
        current_size + (1 << 23)
    }
}

/// Makes sure the buffer is full after this call (unless EOF reached)
/// code adapted from `io::Read::read_exact`
pub(crate) fn fill_buf<R>(reader: &mut buffer_redux::BufReader<R>) -> io::Result<usize>
where
    R: io::Read,
{
    let initial_size = reader.buffer().len();
    let mut num_read = 0;
    while initial_size + num_read < reader.capacity() {
        match reader.read_into_buf() {
            Ok(0) => break,
            Ok(n) => num_read += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(num_read)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_trim_cr() {
        assert_eq!(trim_cr(b"ACGT\r"), b"ACGT");
        assert_eq!(trim_cr(b"ACGT"), b"ACGT");
        assert_eq!(trim_cr(b""), b"");
    }

    #[test]
    fn test_grow_to() {
        assert_eq!(grow_to(BUFSIZE), 2 * BUFSIZE);
        assert_eq!(grow_to(1 << 23), (1 << 23) + (1 << 23));
        assert_eq!(grow_to(1 << 24), (1 << 24) + (1 << 23));
    }
}
