mod config;
mod docx;
mod error;
mod model;
pub mod numbering;
mod xml;

pub use error::Error;
pub use model::{
    BodyFormat, HeadingStyle, OutlineOptions, Profile, Report, TableFormat, default_heading_styles,
};
pub use numbering::{
    HeadingCounters, HeadingOutcome, LevelNumbering, MAX_LEVEL, NumberFormat, NumberingScheme,
    NumberingSummary, Paragraph, number_heading, number_headings, strip_manual_numbering,
};

use std::path::Path;
use std::time::Instant;

use docx::Package;

pub fn tidy_docx(input: &Path, output: &Path, profile: &Profile) -> Result<Report, Error> {
    profile.validate()?;
    let t0 = Instant::now();

    let mut pkg = Package::open(input)?;
    let t_parse = t0.elapsed();

    let report = docx::tidy(&mut pkg, profile)?;
    let t_tidy = t0.elapsed();

    let bytes = pkg.to_bytes()?;
    std::fs::write(output, &bytes).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, tidy={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_tidy - t_parse).as_secs_f64() * 1000.0,
        (t_total - t_tidy).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(report)
}

pub fn tidy_docx_bytes(input: &[u8], profile: &Profile) -> Result<(Vec<u8>, Report), Error> {
    profile.validate()?;
    let t0 = Instant::now();

    let mut pkg = Package::from_bytes(input.to_vec())?;
    let report = docx::tidy(&mut pkg, profile)?;
    let bytes = pkg.to_bytes()?;

    log::info!(
        "Timing: total={:.1}ms (output {} bytes)",
        t0.elapsed().as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok((bytes, report))
}
