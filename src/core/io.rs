//! I/O helpers
//!
//! Compression-aware readers for annotation and mutation tables,
//! buffered writers, and read-only memory maps for indexed FASTA access.

use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read};
use std::path::Path;

/// Default buffer size for BufReader (128KB)
pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// Compression format of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Plain text (uncompressed)
    Plain,
    /// Gzip compressed (.gz)
    Gzip,
    /// Bzip2 compressed (.bz2)
    Bzip2,
}

/// Detect compression format from file path and/or content
///
/// - .gz extension or gzip magic bytes (1f 8b)
/// - .bz2 extension or bzip2 magic bytes (42 5a 68)
/// - Plain text otherwise
pub fn detect_compression(path: &Path) -> io::Result<CompressionFormat> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if extension == "gz" {
        return Ok(CompressionFormat::Gzip);
    }
    if extension == "bz2" {
        return Ok(CompressionFormat::Bzip2);
    }

    let mut file = File::open(path)?;
    let mut magic = [0u8; 3];
    let bytes_read = file.read(&mut magic)?;

    if bytes_read >= 2 && magic[0] == 0x1f && magic[1] == 0x8b {
        Ok(CompressionFormat::Gzip)
    } else if bytes_read >= 3 && magic == [0x42, 0x5a, 0x68] {
        Ok(CompressionFormat::Bzip2)
    } else {
        Ok(CompressionFormat::Plain)
    }
}

/// Open a file for buffered reading, decompressing transparently
pub fn open_reader<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();
    let format = detect_compression(path)?;
    let file = File::open(path)?;

    Ok(match format {
        CompressionFormat::Gzip => Box::new(BufReader::with_capacity(
            DEFAULT_BUFFER_SIZE,
            flate2::read::MultiGzDecoder::new(file),
        )),
        CompressionFormat::Bzip2 => Box::new(BufReader::with_capacity(
            DEFAULT_BUFFER_SIZE,
            bzip2::read::BzDecoder::new(file),
        )),
        CompressionFormat::Plain => Box::new(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file)),
    })
}

/// Create a buffered writer with the default buffer size
pub fn create_writer<P: AsRef<Path>>(path: P) -> io::Result<BufWriter<File>> {
    let file = File::create(path)?;
    Ok(BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file))
}

/// Memory-map a file read-only
pub fn map_file<P: AsRef<Path>>(path: P) -> io::Result<Mmap> {
    let file = File::open(path)?;
    // SAFETY: We assume the file won't be modified while mapped
    unsafe { Mmap::map(&file) }
}

/// Line iterator that reuses a buffer to avoid allocations
pub struct LineIterator<R: BufRead> {
    reader: R,
    buffer: String,
}

impl<R: BufRead> LineIterator<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::with_capacity(1024),
        }
    }

    /// Read the next line into the internal buffer
    /// Returns None at EOF, Some(Ok(&str)) on success, Some(Err) on error
    pub fn next_line(&mut self) -> Option<io::Result<&str>> {
        self.buffer.clear();
        match self.reader.read_line(&mut self.buffer) {
            Ok(0) => None,
            Ok(_) => {
                if self.buffer.ends_with('\n') {
                    self.buffer.pop();
                    if self.buffer.ends_with('\r') {
                        self.buffer.pop();
                    }
                }
                Some(Ok(&self.buffer))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_detect_plain() -> io::Result<()> {
        let mut temp = NamedTempFile::new()?;
        writeln!(temp, "plain text")?;
        assert_eq!(detect_compression(temp.path())?, CompressionFormat::Plain);
        Ok(())
    }

    #[test]
    fn test_gzip_round_trip() -> io::Result<()> {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let temp = NamedTempFile::new()?;
        let mut encoder = GzEncoder::new(File::create(temp.path())?, Compression::default());
        encoder.write_all(b"line1\nline2\n")?;
        encoder.finish()?;

        assert_eq!(detect_compression(temp.path())?, CompressionFormat::Gzip);
        let mut iter = LineIterator::new(open_reader(temp.path())?);
        assert_eq!(iter.next_line().unwrap()?, "line1");
        assert_eq!(iter.next_line().unwrap()?, "line2");
        assert!(iter.next_line().is_none());
        Ok(())
    }

    #[test]
    fn test_bzip2_round_trip() -> io::Result<()> {
        use bzip2::write::BzEncoder;
        use bzip2::Compression;

        let temp = NamedTempFile::new()?;
        let mut encoder = BzEncoder::new(File::create(temp.path())?, Compression::default());
        encoder.write_all(b"a\tb\n")?;
        encoder.finish()?;

        assert_eq!(detect_compression(temp.path())?, CompressionFormat::Bzip2);
        let mut iter = LineIterator::new(open_reader(temp.path())?);
        assert_eq!(iter.next_line().unwrap()?, "a\tb");
        Ok(())
    }

    #[test]
    fn test_line_iterator_crlf() -> io::Result<()> {
        let mut temp = NamedTempFile::new()?;
        temp.write_all(b"line1\r\nline2")?;
        temp.flush()?;

        let mut iter = LineIterator::new(open_reader(temp.path())?);
        assert_eq!(iter.next_line().unwrap()?, "line1");
        assert_eq!(iter.next_line().unwrap()?, "line2");
        assert!(iter.next_line().is_none());
        Ok(())
    }

    #[test]
    fn test_map_file() -> io::Result<()> {
        let mut temp = NamedTempFile::new()?;
        temp.write_all(b"test content")?;
        temp.flush()?;

        let mmap = map_file(temp.path())?;
        assert_eq!(&mmap[..], b"test content");
        Ok(())
    }
}
