use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use docx_tidy::{MAX_LEVEL, NumberFormat, OutlineOptions, Profile, Report};

/// Renumber headings and normalize the formatting of Word documents.
#[derive(Parser)]
#[command(name = "docx-tidy", version, about)]
struct Cli {
    /// .docx files to process
    #[arg(required_unless_present = "print_config")]
    inputs: Vec<PathBuf>,

    /// Write results here instead of next to each input
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Appended to the file stem of each output
    #[arg(long, default_value = "_formatted")]
    suffix: String,

    /// JSON profile; fields it leaves out keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the effective profile as JSON and exit
    #[arg(long)]
    print_config: bool,

    /// Leave heading text and Word list numbering alone
    #[arg(long)]
    no_numbering: bool,

    /// Number heading level N with FORMAT, e.g. `3=dotted_path`
    #[arg(long = "level", value_name = "N=FORMAT", value_parser = parse_level_format)]
    levels: Vec<(u8, NumberFormat)>,

    /// Do not number heading level N
    #[arg(long = "skip-level", value_name = "N", value_parser = clap::value_parser!(u8).range(1..=MAX_LEVEL as i64))]
    skip_levels: Vec<u8>,

    /// Skip heading promotion, demotion, indent and list clean-up
    #[arg(long)]
    no_outline: bool,

    /// Print one JSON report line per processed file on stdout
    #[arg(long)]
    json: bool,

    #[arg(long)]
    body_font: Option<String>,

    #[arg(long)]
    body_east_asia_font: Option<String>,

    /// Body font size in points
    #[arg(long)]
    body_size: Option<f32>,

    /// Space before body paragraphs in points
    #[arg(long)]
    body_space_before: Option<f32>,

    /// Space after body paragraphs in points
    #[arg(long)]
    body_space_after: Option<f32>,

    /// Body line spacing as a multiple of single spacing
    #[arg(long)]
    body_line_spacing: Option<f32>,

    /// First-line indent of body paragraphs in cm
    #[arg(long)]
    first_line_indent: Option<f32>,

    #[arg(long)]
    table_font: Option<String>,

    #[arg(long)]
    table_east_asia_font: Option<String>,

    /// Table font size in points
    #[arg(long)]
    table_size: Option<f32>,

    /// Space before cell paragraphs in points
    #[arg(long)]
    table_space_before: Option<f32>,

    /// Space after cell paragraphs in points
    #[arg(long)]
    table_space_after: Option<f32>,

    /// Cell line spacing as a multiple of single spacing
    #[arg(long)]
    table_line_spacing: Option<f32>,

    /// Table width in inches
    #[arg(long)]
    table_width: Option<f32>,
}

fn parse_level_format(s: &str) -> Result<(u8, NumberFormat), String> {
    let (level, format) = s
        .split_once('=')
        .ok_or_else(|| format!("expected N=FORMAT, got `{s}`"))?;
    let level: u8 = level
        .trim()
        .parse()
        .map_err(|_| format!("invalid level `{level}`"))?;
    if !(1..=MAX_LEVEL).contains(&level) {
        return Err(format!("level {level} is outside 1..={MAX_LEVEL}"));
    }
    Ok((level, format.trim().parse()?))
}

impl Cli {
    fn profile(&self) -> Result<Profile, docx_tidy::Error> {
        let mut profile = match &self.config {
            Some(path) => Profile::from_json_file(path)?,
            None => Profile::default(),
        };

        if self.no_numbering {
            profile.numbering.enabled = false;
        }
        for &(level, format) in &self.levels {
            if let Some(rule) = profile.numbering.level_mut(level) {
                rule.apply = true;
                rule.format = format;
            }
        }
        for &level in &self.skip_levels {
            if let Some(rule) = profile.numbering.level_mut(level) {
                rule.apply = false;
            }
        }
        if self.no_outline {
            profile.outline = OutlineOptions::disabled();
        }

        let body = &mut profile.body;
        if let Some(v) = &self.body_font {
            body.font = v.clone();
        }
        if let Some(v) = &self.body_east_asia_font {
            body.east_asia_font = v.clone();
        }
        if let Some(v) = self.body_size {
            body.size_pt = v;
        }
        if let Some(v) = self.body_space_before {
            body.space_before_pt = v;
        }
        if let Some(v) = self.body_space_after {
            body.space_after_pt = v;
        }
        if let Some(v) = self.body_line_spacing {
            body.line_spacing = v;
        }
        if let Some(v) = self.first_line_indent {
            body.first_line_indent_cm = v;
        }

        let table = &mut profile.table;
        if let Some(v) = &self.table_font {
            table.font = v.clone();
        }
        if let Some(v) = &self.table_east_asia_font {
            table.east_asia_font = v.clone();
        }
        if let Some(v) = self.table_size {
            table.size_pt = v;
        }
        if let Some(v) = self.table_space_before {
            table.space_before_pt = v;
        }
        if let Some(v) = self.table_space_after {
            table.space_after_pt = v;
        }
        if let Some(v) = self.table_line_spacing {
            table.line_spacing = v;
        }
        if let Some(v) = self.table_width {
            table.width_in = v;
        }

        profile.validate()?;
        Ok(profile)
    }

    fn output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".into());
        let name = format!("{stem}{}.docx", self.suffix);
        match &self.output_dir {
            Some(dir) => dir.join(name),
            None => input.with_file_name(name),
        }
    }
}

fn report_line(input: &Path, output: &Path, report: &Report) -> serde_json::Result<String> {
    serde_json::to_string(&serde_json::json!({
        "input": input,
        "output": output,
        "report": report,
    }))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let profile = match cli.profile() {
        Ok(p) => p,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.print_config {
        return match profile.to_json() {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    if let Some(dir) = &cli.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        log::error!("Cannot create {}: {e}", dir.display());
        return ExitCode::FAILURE;
    }

    let mut failed = 0;
    for input in &cli.inputs {
        let output = cli.output_path(input);
        match docx_tidy::tidy_docx(input, &output, &profile) {
            Ok(report) => {
                log::info!(
                    "{} -> {}: {} headings numbered, {} promoted, {} demoted, {} body paragraphs, {} tables",
                    input.display(),
                    output.display(),
                    report.numbered,
                    report.promoted,
                    report.demoted_empty + report.demoted_without_content,
                    report.body_paragraphs_formatted,
                    report.tables_formatted,
                );
                if cli.json {
                    match report_line(input, &output, &report) {
                        Ok(line) => println!("{line}"),
                        Err(e) => log::error!("{}: {e}", input.display()),
                    }
                }
            }
            Err(e) => {
                log::error!("{}: {e}", input.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        log::error!("{failed} of {} files failed", cli.inputs.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_format_pairs_parse() {
        assert_eq!(parse_level_format("3=dotted_path"), Ok((3, NumberFormat::DottedPath)));
        assert_eq!(parse_level_format(" 1 = chinese "), Ok((1, NumberFormat::Chinese)));
        assert!(parse_level_format("3").is_err());
        assert!(parse_level_format("0=arabic_dot").is_err());
        assert!(parse_level_format("10=arabic_dot").is_err());
        assert!(parse_level_format("x=arabic_dot").is_err());
        assert!(parse_level_format("2=hex").is_err());
    }

    #[test]
    fn output_goes_next_to_input_by_default() {
        let cli = Cli::parse_from(["docx-tidy", "dir/a.docx"]);
        assert_eq!(cli.output_path(Path::new("dir/a.docx")), PathBuf::from("dir/a_formatted.docx"));
    }

    #[test]
    fn output_dir_and_suffix_are_used() {
        let cli = Cli::parse_from(["docx-tidy", "-o", "out", "--suffix", "_x", "dir/a.docx"]);
        assert_eq!(cli.output_path(Path::new("dir/a.docx")), PathBuf::from("out/a_x.docx"));
    }

    #[test]
    fn flags_override_profile_defaults() {
        let cli = Cli::parse_from([
            "docx-tidy",
            "--level",
            "2=circled",
            "--skip-level",
            "4",
            "--body-space-before",
            "3",
            "--body-space-after",
            "9",
            "--table-east-asia-font",
            "楷体",
            "--table-space-before",
            "1",
            "--table-space-after",
            "2",
            "--table-line-spacing",
            "1.5",
            "a.docx",
        ]);
        let profile = cli.profile().unwrap();

        let level2 = profile.numbering.level(2).unwrap();
        assert!(level2.apply);
        assert_eq!(level2.format, NumberFormat::Circled);
        assert!(!profile.numbering.level(4).unwrap().apply);
        assert_eq!(profile.body.space_before_pt, 3.0);
        assert_eq!(profile.body.space_after_pt, 9.0);
        assert_eq!(profile.table.east_asia_font, "楷体");
        assert_eq!(profile.table.space_before_pt, 1.0);
        assert_eq!(profile.table.space_after_pt, 2.0);
        assert_eq!(profile.table.line_spacing, 1.5);
        assert_eq!(profile.table.font, Profile::default().table.font);
    }

    #[test]
    fn out_of_range_override_is_rejected() {
        let cli = Cli::parse_from(["docx-tidy", "--table-line-spacing", "4", "a.docx"]);
        assert!(cli.profile().is_err());
    }

    #[test]
    fn report_line_is_one_json_object() {
        let report = Report {
            numbered: 4,
            tables_formatted: 1,
            ..Report::default()
        };
        let line = report_line(Path::new("a.docx"), Path::new("a_formatted.docx"), &report).unwrap();
        assert!(!line.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["input"], "a.docx");
        assert_eq!(value["output"], "a_formatted.docx");
        assert_eq!(value["report"]["numbered"], 4);
        assert_eq!(value["report"]["tables_formatted"], 1);
        assert_eq!(value["report"]["promoted"], 0);
    }
}
