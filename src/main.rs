//! Desktop entry point. The browser build starts from `web::run` instead.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use clap::Parser;
    use orbit_cube::{AppConfig, BackendPolicy};

    /// Backend choice on the command line
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
    pub enum CliBackend {
        /// Prefer the GPU-compute backend, fall back to GL
        #[default]
        Auto,
        /// Primary wgpu backend only (Vulkan, Metal, DX12)
        #[value(alias = "gpu")]
        Webgpu,
        /// GL backend only
        #[value(aliases = ["gl", "webgl2"])]
        Webgl,
    }

    impl From<CliBackend> for BackendPolicy {
        fn from(cli: CliBackend) -> Self {
            match cli {
                CliBackend::Auto => BackendPolicy::PreferGpuCompute,
                CliBackend::Webgpu => BackendPolicy::ForceGpuCompute,
                CliBackend::Webgl => BackendPolicy::ForceRasterization,
            }
        }
    }

    /// A rotating cube you can orbit with the mouse
    #[derive(Parser, Debug)]
    #[command(name = "orbit-cube", version)]
    pub struct Args {
        /// Graphics backend selection policy
        #[arg(long, env = "ORBIT_CUBE_BACKEND", default_value = "auto", value_enum)]
        pub backend: CliBackend,

        /// Initial window width in logical pixels
        #[arg(long, default_value = "1280")]
        pub width: u32,

        /// Initial window height in logical pixels
        #[arg(long, default_value = "720")]
        pub height: u32,

        /// Disable vertical sync
        #[arg(long)]
        pub no_vsync: bool,

        /// Disable multisampling
        #[arg(long)]
        pub no_msaa: bool,

        /// Log at debug level unless RUST_LOG says otherwise
        #[arg(short, long)]
        pub verbose: bool,
    }

    impl Args {
        pub fn config(&self) -> AppConfig {
            let mut config = AppConfig::default()
                .with_backend_policy(self.backend.into())
                .with_size(self.width, self.height)
                .with_vsync(!self.no_vsync);
            config.antialias = !self.no_msaa;
            config
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), orbit_cube::BootstrapError> {
    use clap::Parser;

    let args = cli::Args::parse();
    let level = if args.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    orbit_cube::logging::init(level);

    orbit_cube::native::run(args.config()).inspect_err(|err| log::error!("{}", err))
}

#[cfg(target_arch = "wasm32")]
fn main() {}
