use layers::DISPLAY_MODE_PRESETS;
use tracing::info;

use crate::config::ViewerConfig;
use crate::controls::{ControlListener, ControlSource};
use crate::surface::LayerSurface;
use crate::sync::{SyncEngine, SyncError};

/// Brings the viewer up: fills the pickers, creates the panes, wires the
/// listener and performs the first refresh.
///
/// `listener` receives every control notification from then on; the caller
/// routes it back into [`SyncEngine::handle`].
pub fn bootstrap(
    config: &ViewerConfig,
    controls: &mut impl ControlSource,
    surface: &mut impl LayerSurface,
    listener: ControlListener,
) -> Result<SyncEngine, SyncError> {
    config.validate()?;
    let catalog = config.catalog()?;
    let selection = catalog.selection(&config.default_bottom, &config.default_top);
    info!(
        years = catalog.len(),
        bottom = %selection.bottom.label,
        top = %selection.top.label,
        "starting imagery compare viewer"
    );

    controls.populate_years(&catalog, selection)?;
    controls.populate_display_modes(&DISPLAY_MODE_PRESETS)?;

    let mut engine = SyncEngine::new(config);
    engine.install_panes(surface)?;
    controls.subscribe(listener)?;
    engine.refresh(&*controls, surface)?;
    Ok(engine)
}
