//! Arguments shared by every executable.

use crate::build_info;
use crate::error::*;
use crate::logging::init_logging;
use crate::operator::OperatorParameters;
use crate::stability::StabilityPolicy;
use clap::Args;
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Args, Clone, Debug)]
pub struct CommonArgs {
    /// Directory for output files, will be created.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Chunk size to use for parallelism.
    #[arg(short, long, default_value = "1024")]
    pub chunk_size: usize,

    /// The number of threads to use.
    #[arg(short, long, default_value = "8")]
    pub threads: usize,

    /// Log level, overrides RUST_LOG.
    #[arg(long)]
    pub log_level: Option<LevelFilter>,

    /// Steps between progress reports, 0 disables them.
    #[arg(long, default_value = "0")]
    pub report_period: usize,

    /// Only warn when the time step exceeds the stability bound.
    #[arg(long)]
    pub allow_unstable: bool,

    /// Print build information and quit
    #[arg(long)]
    pub build_info: bool,
}

impl CommonArgs {
    /// Handles `--build-info`, then sets up logging, the thread pool
    /// and the output directory.
    pub fn cli_setup(&self, name: &str) -> Result<()> {
        if self.build_info {
            build_info::print_report(name);
            std::process::exit(0);
        }

        init_logging(self.log_level);
        log::info!("{name} {}", build_info::git_describe());

        #[cfg(feature = "profile-with-puffin")]
        profiling::puffin::set_scopes_on(true);

        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("rayon_thread_{}", i))
            .build_global()
        {
            log::warn!("keeping the existing thread pool: {e}");
        }

        if let Some(output_dir) = &self.output_dir {
            std::fs::create_dir_all(output_dir)?;
        }
        Ok(())
    }

    pub fn operator_parameters(&self) -> OperatorParameters {
        OperatorParameters {
            chunk_size: self.chunk_size,
            report_period: self.report_period,
            stability: if self.allow_unstable {
                StabilityPolicy::Warn
            } else {
                StabilityPolicy::Reject
            },
            ..Default::default()
        }
    }

    /// `output_dir/name`, `None` without an output directory.
    pub fn output_path(&self, name: &str) -> Option<PathBuf> {
        self.output_dir.as_ref().map(|dir| dir.join(name))
    }

    pub fn frame_path(&self, prefix: &str, i: usize) -> Option<PathBuf> {
        self.output_path(&format!("{prefix}_{:04}.png", i))
    }
}
