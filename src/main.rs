/*!
 * Counter Demo
 *
 * Headless version of the counter/rate widget: one controller process per
 * widget, fed target counts through its input channel the way button clicks
 * would, ticked at frame rate by a tokio task.
 */

use std::time::Duration;
use tracing::info;

use tasktree::demo::{controller_program, DemoConfig, Meter};
use tasktree::{init_tracing_with, Channel, FrameDriver, Runtime, RuntimeConfig, Value};

/// Target counts "clicked" into each widget, one per phase
const CLICKS: [i64; 3] = [300_000, 1_000_000, 90_000];
const WIDGETS: usize = 2;
const PHASE: Duration = Duration::from_millis(1500);
const REPORT_EVERY: Duration = Duration::from_millis(250);

struct Widget {
    input: Channel,
    meter: Meter,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = RuntimeConfig::from_env()?;
    init_tracing_with(config.trace_json);

    info!("tasktree counter demo starting...");

    let runtime = Runtime::from_config(config.clone())?;
    let demo = DemoConfig::default();

    let widgets: Vec<Widget> = (0..WIDGETS)
        .map(|_| {
            let widget = Widget {
                input: Channel::new(),
                meter: Meter::new(),
            };
            runtime.execute(
                &controller_program(demo, widget.meter.clone()),
                vec![Value::from(&widget.input)],
            );
            widget
        })
        .collect();

    let driver = FrameDriver::spawn(runtime.scheduler().clone(), config.frame_interval);

    let mut report = tokio::time::interval(REPORT_EVERY);
    for (phase, base) in CLICKS.iter().enumerate() {
        for (i, widget) in widgets.iter().enumerate() {
            let target = base * (i as i64 + 1);
            info!(phase, widget = i, target, "click");
            widget.input.put(target);
        }

        let deadline = tokio::time::Instant::now() + PHASE;
        while tokio::time::Instant::now() < deadline {
            report.tick().await;
            for (i, widget) in widgets.iter().enumerate() {
                let reading = widget.meter.reading();
                info!(
                    widget = i,
                    count = reading.count,
                    rate_per_ms = %format!("{:.0}", reading.rate_per_ms),
                    relative = %format!("{:.2}", reading.relative),
                    "meter"
                );
            }
        }
    }

    driver.shutdown().await;

    let scheduler = runtime.scheduler().stats();
    let processes = runtime.processes().stats();
    info!(
        scheduler = %serde_json::to_string(&scheduler)?,
        processes = %serde_json::to_string(&processes)?,
        "tasktree counter demo finished"
    );

    Ok(())
}
