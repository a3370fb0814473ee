//! Configuration rendering
//!
//! Renders `cloudflare_waiting_room_event` resource blocks with Tera.
//! Timestamps are always written as RFC3339 UTC so that they compare equal
//! with the values recorded after apply, whatever the host time zone.

use crate::error::{CloudflareError, Result};
use crate::resource::RESOURCE_TYPE;
use crate::waiting_room_event::format_timestamp;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tera::{Context, Tera, Value};

const WAITING_ROOM_EVENT_TEMPLATE_NAME: &str = "waiting_room_event.tf";

const WAITING_ROOM_EVENT_TEMPLATE: &str = r#"
resource "{{ resource_type }}" "{{ resource_name }}" {
  name                    = "{{ name | hcl_string }}"
  zone_id                 = "{{ zone_id | hcl_string }}"
  waiting_room_id         = "{{ waiting_room_id | hcl_string }}"
  event_start_time        = "{{ event_start_time }}"
  event_end_time          = "{{ event_end_time }}"
  total_active_users      = 405
  new_users_per_minute    = 400
  custom_page_html        = "foobar"
  queueing_method         = "fifo"
  shuffle_at_event_start  = false
  disable_session_renewal = true
  suspended               = true
  description             = "my desc"
  session_duration        = 10
}
"#;

/// Parameters of a rendered waiting room event block
#[derive(Debug, Clone)]
pub struct WaitingRoomEventParams<'a> {
    /// Local name of the resource block
    pub resource_name: &'a str,
    pub name: &'a str,
    pub zone_id: &'a str,
    pub waiting_room_id: &'a str,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Renders declarative configuration for waiting room events
pub struct ConfigRenderer {
    tera: Tera,
}

impl ConfigRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.register_filter("hcl_string", hcl_string_filter);
        tera.add_raw_template(WAITING_ROOM_EVENT_TEMPLATE_NAME, WAITING_ROOM_EVENT_TEMPLATE)
            .map_err(|e| CloudflareError::Template(tera_error_detail(&e)))?;
        Ok(Self { tera })
    }

    /// Render one `cloudflare_waiting_room_event` resource block
    pub fn render_waiting_room_event(&self, params: &WaitingRoomEventParams<'_>) -> Result<String> {
        let mut context = Context::new();
        context.insert("resource_type", RESOURCE_TYPE);
        context.insert("resource_name", params.resource_name);
        context.insert("name", params.name);
        context.insert("zone_id", params.zone_id);
        context.insert("waiting_room_id", params.waiting_room_id);
        context.insert("event_start_time", &format_timestamp(&params.start_time));
        context.insert("event_end_time", &format_timestamp(&params.end_time));

        self.tera
            .render(WAITING_ROOM_EVENT_TEMPLATE_NAME, &context)
            .map_err(|e| CloudflareError::Template(tera_error_detail(&e)))
    }
}

/// Render a waiting room event block from its six parameters
pub fn waiting_room_event_config(
    resource_name: &str,
    name: &str,
    zone_id: &str,
    waiting_room_id: &str,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<String> {
    ConfigRenderer::new()?.render_waiting_room_event(&WaitingRoomEventParams {
        resource_name,
        name,
        zone_id,
        waiting_room_id,
        start_time,
        end_time,
    })
}

/// Escape a value for use inside a quoted HCL string
fn hcl_string_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("hcl_string expects a string"))?;

    let mut escaped = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                escaped.push(c);
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    Ok(Value::String(escaped))
}

/// Collect the Tera error and its source chain into one message
fn tera_error_detail(e: &tera::Error) -> String {
    use std::error::Error;

    let mut details = vec![e.to_string()];
    let mut source = e.source();
    while let Some(err) = source {
        details.push(err.to_string());
        source = err.source();
    }
    details.join(" | ")
}
