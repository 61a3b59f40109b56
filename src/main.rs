//! ddos-monitor entrypoint: loads the classifier, captures on the configured interface and prints
//! one ndjson line per cycle/status change on stdout. Operator commands are read from stdin.

use ddos_monitor::{
    capture::LiveCapture,
    classify::ClassificationAdapter,
    config::MonitorConfig,
    logging::{ReportLine, StructuredLogger},
    model::ClassifierModel,
    monitor::{Monitor, MonitorEvent},
};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, broadcast::error::RecvError, mpsc};
use tracing::{info, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start,
    Stop,
    Reset,
    Status,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "start" => Some(Command::Start),
            "stop" => Some(Command::Stop),
            "reset" => Some(Command::Reset),
            "status" => Some(Command::Status),
            "quit" | "exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

fn spawn_stdin_reader(tx: mpsc::Sender<Command>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match Command::parse(&line) {
                Some(cmd) => {
                    if tx.blocking_send(cmd).is_err() {
                        break;
                    }
                }
                None => warn!(input = %line.trim(), "unknown command (start|stop|reset|status|quit)"),
            }
        }
    });
}

fn render(event: &MonitorEvent) {
    let mut out = std::io::stdout().lock();
    match event {
        MonitorEvent::Cycle(report) => StructuredLogger::emit_json(&ReportLine::cycle(report), &mut out),
        MonitorEvent::Status(status) => StructuredLogger::emit_json(&ReportLine::status(status), &mut out),
        MonitorEvent::Reset => info!("graph reset"),
    }
}

fn handle(monitor: &Monitor, cmd: Command) {
    let result = match cmd {
        Command::Start => monitor.start().map(|_| ()),
        Command::Stop => monitor.stop(),
        Command::Reset => {
            monitor.reset();
            Ok(())
        }
        Command::Status => {
            info!(
                lifecycle = %monitor.lifecycle(),
                status = %monitor.status(),
                cycle = monitor.cycle(),
                "monitor status"
            );
            Ok(())
        }
        Command::Quit => Ok(()),
    };
    if let Err(e) = result {
        warn!(error = %e, "command rejected");
    }
}

async fn run(monitor: Monitor, autostart: bool, interrupt: Arc<AtomicBool>) -> Result<(), BoxError> {
    let events = monitor.subscribe();
    let (tx, commands) = mpsc::channel::<Command>(16);

    let quit = tx.clone();
    let flag = Arc::clone(&interrupt);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::Relaxed);
        let _ = quit.try_send(Command::Quit);
    })?;
    spawn_stdin_reader(tx);

    if autostart {
        monitor.start()?;
    }
    drive(&monitor, commands, events, &interrupt).await;
    Ok(())
}

/// Serve commands and render events until quit, then cancel capture and shut down.
async fn drive(
    monitor: &Monitor,
    mut commands: mpsc::Receiver<Command>,
    mut events: broadcast::Receiver<MonitorEvent>,
    interrupt: &AtomicBool,
) {
    loop {
        tokio::select! {
            cmd = commands.recv() => match cmd {
                None | Some(Command::Quit) => break,
                Some(cmd) => handle(monitor, cmd),
            },
            event = events.recv() => match event {
                Ok(event) => render(&event),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "presentation fell behind; events dropped"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    info!("ddos monitor stopping");
    // a capture blocked on a quiet interface returns its partial batch
    interrupt.store(true, Ordering::Relaxed);
    monitor.shutdown().await;
    while let Ok(event) = events.try_recv() {
        render(&event);
    }
}

fn main() -> Result<(), BoxError> {
    let config_path = std::env::var("DDOS_MONITOR_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("config.json"));
    let config = MonitorConfig::load(&config_path);

    StructuredLogger::init(config.log.json, &config.log.level);
    config.validate()?;

    info!(
        interface = %config.interface,
        batch_packets = config.batch_packets,
        cycle_delay_ms = config.cycle_delay_ms,
        "ddos monitor starting"
    );

    let model = Arc::new(ClassifierModel::load(&config.model)?);
    let adapter = ClassificationAdapter::new(model);

    let interrupt = Arc::new(AtomicBool::new(false));
    let source = LiveCapture::new(config.interface.clone(), config.read_timeout(), Arc::clone(&interrupt));

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(async {
        let monitor = Monitor::new(&config, source, adapter);
        run(monitor, config.autostart, interrupt).await
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddos_monitor::capture::{CaptureError, PacketSource, RawPacket};
    use ddos_monitor::features::FEATURE_DIM;
    use ddos_monitor::model::{Estimator, ModelError, StandardScaler};
    use std::time::Duration;

    struct Benign;

    impl Estimator for Benign {
        fn predict(&self, _scaled: &[f64]) -> Result<i64, ModelError> {
            Ok(0)
        }
    }

    /// Never sees a packet; only the interrupt ends a batch.
    struct QuietInterface {
        interrupt: Arc<AtomicBool>,
    }

    impl PacketSource for QuietInterface {
        fn next_batch(&mut self, _count: usize) -> Result<Vec<RawPacket>, CaptureError> {
            while !self.interrupt.load(Ordering::Relaxed) {
                std::thread::sleep(Duration::from_millis(5));
            }
            Ok(Vec::new())
        }
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse(" Start "), Some(Command::Start));
        assert_eq!(Command::parse("exit"), Some(Command::Quit));
        assert_eq!(Command::parse("pause"), None);
    }

    #[tokio::test]
    async fn quit_interrupts_blocked_capture() {
        let interrupt = Arc::new(AtomicBool::new(false));
        let source = QuietInterface {
            interrupt: Arc::clone(&interrupt),
        };
        let model = ClassifierModel::new(StandardScaler::identity(FEATURE_DIM), Box::new(Benign));
        let adapter = ClassificationAdapter::new(Arc::new(model));
        let monitor = Monitor::new(&MonitorConfig::default(), source, adapter);

        let events = monitor.subscribe();
        let (tx, commands) = mpsc::channel(4);
        monitor.start().unwrap();
        tx.send(Command::Quit).await.unwrap();

        tokio::time::timeout(Duration::from_secs(5), drive(&monitor, commands, events, &interrupt))
            .await
            .expect("quit returns while capture is idle");
        assert!(interrupt.load(Ordering::Relaxed));
    }
}
