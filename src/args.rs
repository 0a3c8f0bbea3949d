//! Command line arguments
//!
//! Native builds parse the command line with clap; the web build always uses
//! [`ShowcaseConfig::default`].

use clap::Parser;

use crate::ShowcaseConfig;

/// Light showcase arguments.
#[derive(Parser, Debug)]
#[command(
    name = "light-showcase",
    about = "Interactive showcase of the six light kinds",
    long_about = "Renders four meshes lit by ambient, hemisphere, directional, point, \
        spot and rect area lights. Every light is editable from the panel.\n\n\
        CONTROLS:\n\
          Left drag       orbit\n\
          Right drag      pan (or Shift + left drag)\n\
          Wheel           zoom\n\
          F1              toggle the light panel\n\
          H               toggle light helpers\n\
          R               reset the camera\n\
          Escape          quit\n\
        \n\
        EXAMPLES:\n\
          # Run headless smoke test\n\
          ./light-showcase --max-frames 10",
    version
)]
pub struct ShowcaseArgs {
    /// Initial window width in logical pixels.
    #[arg(long, default_value = "1280")]
    pub width: u32,

    /// Initial window height in logical pixels.
    #[arg(long, default_value = "720")]
    pub height: u32,

    /// Disable vertical sync (may cause tearing).
    #[arg(long)]
    pub no_vsync: bool,

    /// Disable 4x multisampling.
    #[arg(long)]
    pub no_antialias: bool,

    /// Disable shadow maps.
    #[arg(long)]
    pub no_shadows: bool,

    /// Upper bound for the device pixel ratio.
    #[arg(long, default_value = "2.0")]
    pub max_pixel_ratio: f64,

    /// Exit after rendering N frames (useful for testing).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_frames: Option<u64>,

    /// Start with the light panel hidden.
    #[arg(long)]
    pub hide_panel: bool,
}

impl From<ShowcaseArgs> for ShowcaseConfig {
    fn from(args: ShowcaseArgs) -> Self {
        if args.width == 0 || args.height == 0 {
            log::warn!(
                "Window size {}x{} is empty, using 1x1 minimum",
                args.width,
                args.height
            );
        }

        Self {
            width: args.width.max(1),
            height: args.height.max(1),
            vsync: !args.no_vsync,
            antialias: !args.no_antialias,
            shadows: !args.no_shadows,
            max_pixel_ratio: args.max_pixel_ratio,
            max_frames: args.max_frames,
            show_panel: !args.hide_panel,
            ..Self::default()
        }
    }
}
