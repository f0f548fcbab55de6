use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

use crate::args::Args;

pub(crate) fn init(args: &Args) {
    let filter = args.log_level.unwrap_or_default().as_filter_str();
    let env_filter = EnvFilter::new(filter);

    tracing_subscriber::registry()
        .with(args.log_format())
        .with(env_filter)
        .init();
}
