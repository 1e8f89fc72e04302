//! File-backed and random grid collaborators for the engine.
//!
//! The initial grid comes from `images/{width}x{height}.pgm` when such a
//! file exists, and from a seeded random source otherwise. Snapshots are
//! written to `out/{label}.pgm`. The PGM support here is wiring for the
//! binary only -- the core never sees a file format, just the
//! cell-at-a-time source and sink contracts.

use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use conway_core::config::SimulationConfig;
use conway_core::io::{GridSink, GridSource, IoError};
use conway_core::snapshot::source_label;
use conway_types::CellState;
use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng as _};
use tracing::info;

/// Directory searched for initial grid images.
pub const INPUT_DIR: &str = "images";

/// Directory snapshots are written to.
pub const OUTPUT_DIR: &str = "out";

/// A [`GridSource`] that produces a seeded random population.
#[derive(Debug)]
pub struct RandomSource {
    rng: StdRng,
    /// Probability that a cell starts alive, in `[0.0, 1.0]`.
    density: f64,
}

impl RandomSource {
    /// Create a source with the given seed and alive-density percentage.
    /// The density is clamped to `[0, 100]`.
    pub fn new(seed: u64, density_percent: u8) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            density: f64::from(density_percent.min(100)) / 100.0,
        }
    }
}

impl GridSource for RandomSource {
    fn next_cell(&mut self) -> Result<CellState, IoError> {
        if self.rng.random_bool(self.density) {
            Ok(CellState::Alive)
        } else {
            Ok(CellState::Dead)
        }
    }
}

/// A [`GridSource`] backed by a binary (`P5`) PGM file.
#[derive(Debug)]
pub struct PgmSource {
    raster: Vec<u8>,
    cursor: usize,
}

impl PgmSource {
    /// Open a PGM file and check its dimensions against the run
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Io`] if the file cannot be read, or
    /// [`IoError::Malformed`] if it is not a `P5` image of the expected
    /// size.
    pub fn open(path: &Path, width: usize, height: usize) -> Result<Self, IoError> {
        let bytes = std::fs::read(path)?;
        let (file_width, file_height, raster) = parse_pgm(&bytes)?;
        if file_width != width || file_height != height {
            return Err(IoError::Malformed {
                reason: format!(
                    "image is {file_width}x{file_height}, expected {width}x{height}"
                ),
            });
        }
        Ok(Self { raster, cursor: 0 })
    }
}

impl GridSource for PgmSource {
    fn next_cell(&mut self) -> Result<CellState, IoError> {
        let byte = self
            .raster
            .get(self.cursor)
            .copied()
            .ok_or(IoError::SourceExhausted)?;
        self.cursor = self.cursor.saturating_add(1);
        Ok(CellState::from_byte(byte))
    }
}

/// Parse a binary PGM: magic `P5`, width, height, maxval, then the raster.
fn parse_pgm(bytes: &[u8]) -> Result<(usize, usize, Vec<u8>), IoError> {
    let mut cursor = 0;

    let magic = next_token(bytes, &mut cursor)?;
    if magic != "P5" {
        return Err(IoError::Malformed {
            reason: format!("expected P5 magic, got {magic:?}"),
        });
    }

    let width = parse_field(bytes, &mut cursor, "width")?;
    let height = parse_field(bytes, &mut cursor, "height")?;
    let maxval = parse_field(bytes, &mut cursor, "maxval")?;
    if maxval != 255 {
        return Err(IoError::Malformed {
            reason: format!("expected maxval 255, got {maxval}"),
        });
    }

    // Exactly one whitespace byte separates the header from the raster;
    // `next_token` left the cursor on it.
    cursor = cursor.saturating_add(1);
    let raster: Vec<u8> = bytes.get(cursor..).unwrap_or_default().to_vec();
    let expected = width.saturating_mul(height);
    if raster.len() < expected {
        return Err(IoError::Malformed {
            reason: format!("raster holds {} bytes, expected {expected}", raster.len()),
        });
    }
    Ok((width, height, raster))
}

/// Read the next whitespace-delimited ASCII token, leaving the cursor on
/// the byte that terminated it.
fn next_token(bytes: &[u8], cursor: &mut usize) -> Result<String, IoError> {
    while bytes.get(*cursor).is_some_and(u8::is_ascii_whitespace) {
        *cursor = cursor.saturating_add(1);
    }
    let start = *cursor;
    while bytes
        .get(*cursor)
        .is_some_and(|byte| !byte.is_ascii_whitespace())
    {
        *cursor = cursor.saturating_add(1);
    }
    if start == *cursor {
        return Err(IoError::Malformed {
            reason: "truncated PGM header".to_owned(),
        });
    }
    let token = bytes.get(start..*cursor).unwrap_or_default();
    String::from_utf8(token.to_vec()).map_err(|_utf8| IoError::Malformed {
        reason: "non-ASCII PGM header".to_owned(),
    })
}

/// Parse one numeric header field.
fn parse_field(bytes: &[u8], cursor: &mut usize, name: &str) -> Result<usize, IoError> {
    let token = next_token(bytes, cursor)?;
    token.parse().map_err(|_parse| IoError::Malformed {
        reason: format!("bad PGM {name}: {token:?}"),
    })
}

/// A [`GridSink`] writing one binary PGM file per snapshot label.
#[derive(Debug)]
pub struct PgmSink {
    dir: PathBuf,
    width: usize,
    height: usize,
    current: Option<BufWriter<File>>,
}

impl PgmSink {
    /// Create a sink writing `{label}.pgm` files under `dir`.
    pub const fn new(dir: PathBuf, width: usize, height: usize) -> Self {
        Self {
            dir,
            width,
            height,
            current: None,
        }
    }

    fn finish_current(&mut self) -> Result<(), IoError> {
        if let Some(mut writer) = self.current.take() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl GridSink for PgmSink {
    fn begin_image(&mut self, label: &str) -> Result<(), IoError> {
        self.finish_current()?;
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{label}.pgm"));
        let mut writer = BufWriter::new(File::create(&path)?);
        write!(writer, "P5\n{} {}\n255\n", self.width, self.height)?;
        info!(path = %path.display(), "snapshot started");
        self.current = Some(writer);
        Ok(())
    }

    fn write_cell(&mut self, state: CellState) -> Result<(), IoError> {
        let writer = self.current.as_mut().ok_or_else(|| IoError::Malformed {
            reason: "write_cell before begin_image".to_owned(),
        })?;
        writer.write_all(&[state.to_byte()])?;
        Ok(())
    }

    fn flush_idle(&mut self) -> Result<(), IoError> {
        self.finish_current()
    }
}

/// Pick the initial grid source: a stored image matching the configured
/// dimensions if one exists, a seeded random population otherwise.
pub fn open_source(config: &SimulationConfig) -> Result<Box<dyn GridSource>, IoError> {
    let width = config.grid.width;
    let height = config.grid.height;
    let path = Path::new(INPUT_DIR).join(format!("{}.pgm", source_label(width, height)));

    if path.exists() {
        info!(path = %path.display(), "loading initial grid from image");
        Ok(Box::new(PgmSource::open(&path, width, height)?))
    } else {
        info!(
            seed = config.grid.seed,
            density_percent = config.grid.density_percent,
            "no stored image, generating random initial grid"
        );
        Ok(Box::new(RandomSource::new(
            config.grid.seed,
            config.grid.density_percent,
        )))
    }
}
