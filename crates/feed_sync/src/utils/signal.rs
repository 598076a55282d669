use std::io;

use tokio::signal;

#[cfg(target_family = "windows")]
pub async fn terminate() -> io::Result<()> {
    signal::ctrl_c().await
}

/// ctrl + c delivers SIGINT while docker stop delivers SIGTERM; both should
/// shut the poll loop down.
#[cfg(target_family = "unix")]
pub async fn terminate() -> io::Result<()> {
    use tokio::select;

    let mut term = signal::unix::signal(signal::unix::SignalKind::terminate())?;
    let mut int = signal::unix::signal(signal::unix::SignalKind::interrupt())?;
    select! {
        _ = term.recv() => Ok(()),
        _ = int.recv() => Ok(()),
    }
}
