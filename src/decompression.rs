use anyhow::{anyhow, Context, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Chain, Cursor, Read};
use std::path::Path;

type Source = Chain<Cursor<Vec<u8>>, Box<dyn Read + Send>>;
type GzipReader = BufReader<MultiGzDecoder<Source>>;
type ZstdReader = BufReader<zstd::Decoder<'static, BufReader<Source>>>;
type PlainReader = BufReader<Source>;

/// Path that stands for standard input
pub const STDIN_PATH: &str = "-";

/// Streaming decompression wrapper that implements BufRead
/// Detects gzip (1F 8B 08) and zstd (28 B5 2F FD) compression using magic bytes
pub enum DecompressionReader {
    Gzip(GzipReader),
    /// Zstd decoder requires BufRead input and provides Read output
    Zstd(ZstdReader),
    Plain(PlainReader),
}

// zstd::Decoder doesn't implement Debug
impl std::fmt::Debug for DecompressionReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecompressionReader::Gzip(_) => write!(f, "DecompressionReader::Gzip"),
            DecompressionReader::Zstd(_) => write!(f, "DecompressionReader::Zstd"),
            DecompressionReader::Plain(_) => write!(f, "DecompressionReader::Plain"),
        }
    }
}

impl BufRead for DecompressionReader {
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        match self {
            DecompressionReader::Gzip(reader) => reader.fill_buf(),
            DecompressionReader::Zstd(reader) => reader.fill_buf(),
            DecompressionReader::Plain(reader) => reader.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            DecompressionReader::Gzip(reader) => reader.consume(amt),
            DecompressionReader::Zstd(reader) => reader.consume(amt),
            DecompressionReader::Plain(reader) => reader.consume(amt),
        }
    }
}

impl Read for DecompressionReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            DecompressionReader::Gzip(reader) => reader.read(buf),
            DecompressionReader::Zstd(reader) => reader.read(buf),
            DecompressionReader::Plain(reader) => reader.read(buf),
        }
    }
}

impl DecompressionReader {
    /// Open a file, or stdin for `-`, with compression auto-detection
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        if path_ref == Path::new(STDIN_PATH) {
            return Self::from_reader(Box::new(std::io::stdin()))
                .context("Failed to read from stdin");
        }

        if let Some(extension) = path_ref.extension().and_then(|ext| ext.to_str()) {
            if extension.eq_ignore_ascii_case("zip") {
                return Err(anyhow!(
                    "ZIP file decompression is not supported. Only gzip and zstd files are supported for streaming decompression. Extract the ZIP file first: unzip {}",
                    path_ref.display()
                ));
            }
        }

        let file = File::open(path_ref)
            .with_context(|| format!("Failed to open input file '{}'", path_ref.display()))?;
        Self::from_reader(Box::new(file))
            .with_context(|| format!("Failed to detect compression format of '{}'", path_ref.display()))
    }

    /// Sniff the first bytes of `reader` and wrap it in the matching decoder
    pub fn from_reader(mut reader: Box<dyn Read + Send>) -> std::io::Result<Self> {
        let mut head = [0u8; 4];
        let n = read_head(&mut reader, &mut head)?;

        // Put the read bytes back in front using a cursor chain
        let chained: Source = Cursor::new(head[..n].to_vec()).chain(reader);

        let is_gzip = n >= 3 && head[..3] == [0x1F, 0x8B, 0x08];
        let is_zstd = n >= 4 && head == [0x28, 0xB5, 0x2F, 0xFD];

        if is_gzip {
            Ok(DecompressionReader::Gzip(BufReader::new(MultiGzDecoder::new(chained))))
        } else if is_zstd {
            let decoder = zstd::Decoder::new(chained)?;
            Ok(DecompressionReader::Zstd(BufReader::new(decoder)))
        } else {
            Ok(DecompressionReader::Plain(BufReader::new(chained)))
        }
    }

    pub fn format_name(&self) -> &'static str {
        match self {
            DecompressionReader::Gzip(_) => "gzip",
            DecompressionReader::Zstd(_) => "zstd",
            DecompressionReader::Plain(_) => "plain",
        }
    }
}

/// Fill `head` as far as the stream allows; pipes may return short reads
fn read_head(reader: &mut dyn Read, head: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < head.len() {
        match reader.read(&mut head[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
