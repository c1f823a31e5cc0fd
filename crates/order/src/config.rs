//! Order service settings beyond the shared server config.

const DEFAULT_EVENT_BUS_CAPACITY: usize = 1024;

/// Reads:
/// - `EVENT_BUS_CAPACITY`: envelopes buffered per slow subscriber (default: `1024`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSettings {
    pub event_bus_capacity: usize,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            event_bus_capacity: DEFAULT_EVENT_BUS_CAPACITY,
        }
    }
}

impl OrderSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            event_bus_capacity: lookup("EVENT_BUS_CAPACITY")
                .and_then(|v| v.parse().ok())
                .filter(|c| *c > 0)
                .unwrap_or(DEFAULT_EVENT_BUS_CAPACITY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_defaults_and_overrides() {
        assert_eq!(OrderSettings::from_lookup(|_| None), OrderSettings::default());

        let settings = OrderSettings::from_lookup(|key| {
            (key == "EVENT_BUS_CAPACITY").then(|| "16".to_string())
        });
        assert_eq!(settings.event_bus_capacity, 16);
    }

    #[test]
    fn zero_capacity_is_ignored() {
        let settings = OrderSettings::from_lookup(|_| Some("0".to_string()));
        assert_eq!(settings.event_bus_capacity, 1024);
    }
}
