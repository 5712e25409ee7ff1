// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! xcsg command line

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use xcsg::cli::{Reporter, Runner};
use xcsg::{Config, ExportFlags};

#[derive(Parser)]
#[command(name = "xcsg")]
#[command(version)]
#[command(about = "xcsg - XML based Constructive Solid Geometry", long_about = None)]
struct Cli {
    /// Input .xcsg file, or an OpenSCAD .csg file to convert first
    #[arg(value_name = "XCSG_FILE")]
    input: PathBuf,

    /// Configuration file (defaults to ./xcsg.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of boolean operations
    #[arg(long = "max-bool", alias = "max_bool", value_name = "N")]
    max_bool: Option<usize>,

    /// Show full paths of created files
    #[arg(long)]
    fullpath: bool,

    /// Log internal diagnostics (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    /// Write AMF inside a zip archive
    #[arg(long)]
    amf_compress: bool,

    /// Re-export as xcsg (<name>_out.xcsg)
    #[arg(long)]
    xcsg: bool,

    /// 3D: AMF
    #[arg(long)]
    amf: bool,

    /// 3D: Wavefront OBJ
    #[arg(long)]
    obj: bool,

    /// 3D: Object File Format
    #[arg(long)]
    off: bool,

    /// 3D: binary STL
    #[arg(long)]
    stl: bool,

    /// 3D: ASCII STL (ignored when --stl is given)
    #[arg(long)]
    astl: bool,

    /// 2D: SVG
    #[arg(long)]
    svg: bool,

    /// 2D: DXF
    #[arg(long)]
    dxf: bool,
}

impl Cli {
    fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }

    fn export_flags(&self) -> ExportFlags {
        ExportFlags {
            xcsg: self.xcsg,
            amf: self.amf,
            obj: self.obj,
            off: self.off,
            stl: self.stl,
            astl: self.astl,
            svg: self.svg,
            dxf: self.dxf,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    config.export = config.export.union(cli.export_flags());
    if let Some(max_bool) = cli.max_bool {
        config.max_bool = max_bool;
    }
    config.full_path |= cli.fullpath;
    config.amf_compress |= cli.amf_compress;

    let mut reporter = Reporter::new(config.path_display());
    let mut runner = Runner::new(config);
    if let Err(e) = runner.run(&cli.input, &mut reporter) {
        Reporter::report_error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}
