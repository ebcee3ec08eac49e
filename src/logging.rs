pub fn init_logger(verbose: bool) {
    let max_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();
}
