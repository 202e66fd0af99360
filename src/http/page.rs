// Status page

use chrono::{DateTime, Utc};

use crate::state::{ActivityType, ServerState, ServerStatus};

/// Display information of a status
pub struct StatusInfo {
    pub icon: &'static str,
    pub text: &'static str,
    pub color: &'static str,
    pub description: &'static str,
}

impl StatusInfo {
    /// Gets the display information of a status
    pub fn of(status: ServerStatus) -> StatusInfo {
        match status {
            ServerStatus::Starting => StatusInfo {
                icon: "loader",
                text: "STARTING",
                color: "#9e9e9e",
                description: "The server is getting ready...",
            },
            ServerStatus::WaitingCamera => StatusInfo {
                icon: "alert-circle",
                text: "WAITING FOR CAMERA",
                color: "#ffa726",
                description: "Server running, no camera signal",
            },
            ServerStatus::CameraOnly => StatusInfo {
                icon: "camera",
                text: "CAMERA WITHOUT OBS",
                color: "#ff9800",
                description: "Camera connected, waiting for OBS",
            },
            ServerStatus::ObsWaitingCamera => StatusInfo {
                icon: "monitor",
                text: "OBS WITHOUT CAMERA",
                color: "#42a5f5",
                description: "OBS connected, waiting for the camera signal",
            },
            ServerStatus::Streaming => StatusInfo {
                icon: "radio",
                text: "STREAMING",
                color: "#4caf50",
                description: "Everything is working",
            },
            ServerStatus::Error => StatusInfo {
                icon: "alert-triangle",
                text: "ERROR",
                color: "#f44336",
                description: "A problem was detected",
            },
        }
    }
}

/// Formats an uptime in seconds (eg: 45s, 12m, 3h 5m, 2d 4h)
pub fn format_uptime(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{}s", seconds);
    }

    let minutes = seconds / 60;

    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;

    if hours < 24 {
        return format!("{}h {}m", hours, minutes % 60);
    }

    format!("{}d {}h", hours / 24, hours % 24)
}

/// Formats the time elapsed since a moment (eg: 5 minutes ago)
pub fn format_time_ago(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - time).num_seconds().max(0);

    if seconds < 60 {
        return format!("{} seconds ago", seconds);
    }

    let (amount, unit) = if seconds < 3600 {
        (seconds / 60, "minute")
    } else if seconds < 86400 {
        (seconds / 3600, "hour")
    } else {
        (seconds / 86400, "day")
    };

    if amount > 1 {
        format!("{} {}s ago", amount, unit)
    } else {
        format!("{} {} ago", amount, unit)
    }
}

/// Escapes text to be placed inside HTML
pub fn escape_html(text: &str) -> String {
    let mut res = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => res.push_str("&amp;"),
            '<' => res.push_str("&lt;"),
            '>' => res.push_str("&gt;"),
            '"' => res.push_str("&quot;"),
            '\'' => res.push_str("&#39;"),
            _ => res.push(c),
        }
    }

    res
}

fn activity_color(activity_type: ActivityType) -> &'static str {
    match activity_type {
        ActivityType::Success => "#4caf50",
        ActivityType::Warning => "#ffa726",
        ActivityType::Error => "#f44336",
    }
}

const PAGE_STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: system-ui, sans-serif; background: #0f0f1e; color: #e4e4e7; padding: 24px; }
h1 { font-size: 22px; margin-bottom: 16px; }
h2 { font-size: 15px; margin-bottom: 10px; color: #a1a1aa; text-transform: uppercase; }
.grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(320px, 1fr)); gap: 16px; }
.card { background: #1e1e2e; border-radius: 10px; padding: 16px; }
.status { border-left: 6px solid; }
.status-text { font-size: 20px; font-weight: bold; }
.row { display: flex; justify-content: space-between; padding: 4px 0; }
.muted { color: #71717a; font-size: 13px; }
ul { list-style: none; }
li { padding: 4px 0; border-bottom: 1px solid #27272a; font-size: 14px; }
pre { font-size: 12px; max-height: 420px; overflow-y: auto; white-space: pre-wrap; }
"#;

/// Renders the status page
///
/// # Arguments
///
/// * `state` - Snapshot of the server state
/// * `logs` - Most recent log lines, oldest first
/// * `ws_port` - Port of the viewer WebSocket server, for the live updates
/// * `now` - Current time
pub fn render_status_page(
    state: &ServerState,
    logs: &[String],
    ws_port: u32,
    now: DateTime<Utc>,
) -> String {
    let status = StatusInfo::of(state.status);
    let uptime = format_uptime(state.uptime_at(now));

    let last_event = match (&state.last_event, state.last_event_time) {
        (Some(event), Some(time)) => format!(
            "{} <span class=\"muted\">({})</span>",
            escape_html(event),
            format_time_ago(time, now)
        ),
        (Some(event), None) => escape_html(event),
        _ => "-".to_string(),
    };

    let camera = match (&state.camera_ip, state.camera_connected) {
        (Some(ip), true) => format!("Connected ({})", escape_html(ip)),
        (None, true) => "Connected".to_string(),
        _ => "Disconnected".to_string(),
    };

    let obs = match (&state.obs_ip, state.obs_connected) {
        (Some(ip), true) => format!("Connected ({})", escape_html(ip)),
        (None, true) => "Connected".to_string(),
        _ => "Disconnected".to_string(),
    };

    let activities: String = state
        .activities
        .iter()
        .map(|a| {
            format!(
                "<li><span style=\"color: {}\" data-icon=\"{}\">&#9679;</span> {} <span class=\"muted\">{}</span></li>\n",
                activity_color(a.activity_type),
                escape_html(&a.icon),
                escape_html(&a.message),
                format_time_ago(a.timestamp, now)
            )
        })
        .collect();

    let errors: String = state
        .errors
        .iter()
        .map(|e| {
            format!(
                "<li>{} <span class=\"muted\">{}</span></li>\n",
                escape_html(&e.message),
                format_time_ago(e.timestamp, now)
            )
        })
        .collect();

    let log_text = if logs.is_empty() {
        "No logs yet...".to_string()
    } else {
        escape_html(&logs.join("\n"))
    };

    let metrics = &state.metrics;

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8" />
<title>RTMP Server - Status</title>
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<style>{style}</style>
</head>
<body>
<h1>RTMP Server</h1>
<div class="grid">
  <div class="card status" style="border-color: {color}">
    <div class="status-text" id="status-text" style="color: {color}" data-icon="{icon}">{status_text}</div>
    <div class="muted">{description}</div>
    <div class="row"><span>Uptime</span><span id="uptime">{uptime}</span></div>
    <div class="row"><span>Last event</span><span>{last_event}</span></div>
  </div>
  <div class="card">
    <h2>Connections</h2>
    <div class="row"><span>Camera</span><span>{camera}</span></div>
    <div class="row"><span>OBS</span><span>{obs}</span></div>
  </div>
  <div class="card">
    <h2>Metrics</h2>
    <div class="row"><span>Bitrate</span><span id="bitrate">{bitrate} Mbps</span></div>
    <div class="row"><span>Dropped frames</span><span id="dropped-frames">{dropped_frames}</span></div>
    <div class="row"><span>CPU</span><span id="cpu">{cpu}%</span></div>
    <div class="row"><span>Memory</span><span id="memory">{memory} MB</span></div>
  </div>
  <div class="card">
    <h2>Activity</h2>
    <ul>
{activities}    </ul>
  </div>
  <div class="card">
    <h2>Errors</h2>
    <ul>
{errors}    </ul>
  </div>
</div>
<div class="card" style="margin-top: 16px">
  <h2>Logs</h2>
  <pre id="logs">{log_text}</pre>
</div>
<script>
(function () {{
  var logs = document.getElementById("logs");
  function connect() {{
    var ws = new WebSocket("ws://" + location.hostname + ":{ws_port}");
    ws.onmessage = function (event) {{
      var msg = JSON.parse(event.data);
      if (msg.type === "new_logs") {{
        logs.textContent += "\n" + msg.data.join("\n");
        logs.scrollTop = logs.scrollHeight;
      }} else if (msg.type === "metrics_update") {{
        document.getElementById("bitrate").textContent = msg.data.bitrate + " Mbps";
        document.getElementById("dropped-frames").textContent = msg.data.droppedFrames;
        document.getElementById("cpu").textContent = msg.data.cpu + "%";
        document.getElementById("memory").textContent = msg.data.memory + " MB";
      }} else if (msg.type === "state_update" || msg.type === "new_activity") {{
        location.reload();
      }}
    }};
    ws.onclose = function () {{
      setTimeout(connect, 3000);
    }};
  }}
  connect();
}})();
</script>
</body>
</html>
"#,
        style = PAGE_STYLE,
        color = status.color,
        icon = status.icon,
        status_text = status.text,
        description = status.description,
        uptime = uptime,
        last_event = last_event,
        camera = camera,
        obs = obs,
        bitrate = metrics.bitrate,
        dropped_frames = metrics.dropped_frames,
        cpu = metrics.cpu,
        memory = metrics.memory,
        activities = activities,
        errors = errors,
        log_text = log_text,
        ws_port = ws_port,
    )
}
