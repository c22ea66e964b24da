use crate::core_network::error::DataConnectionError;
use std::fmt;

const MAX_PORT: u32 = 65535;

/// The set of ports eligible for passive mode listeners.
///
/// Ports are kept in the order they were configured and reserved in that order. The
/// structure holds no lock of its own: the owning `DataConnectionConfig` serializes
/// every call behind a single mutex.
#[derive(Debug, Clone)]
pub struct PassivePorts {
    ports: Vec<u16>,
    reserved: Vec<bool>,
}

impl PassivePorts {
    /// Parses a port specification such as `"2300-2400,2500"`.
    ///
    /// Items are separated by commas. Each item is a single port, a closed range
    /// (`a-b`), or an open range (`a-` up to 65535, `-b` starting at 1). Port `0` stands
    /// for "any free port" and lets the operating system choose.
    pub fn parse(spec: &str) -> Result<Self, DataConnectionError> {
        let mut ports: Vec<u16> = Vec::new();

        for item in spec.split(',') {
            let item: String = item.chars().filter(|c| !c.is_whitespace()).collect();
            if item.is_empty() {
                continue;
            }

            let (start, end) = match item.split_once('-') {
                Some((start, end)) => {
                    let start = if start.is_empty() { 1 } else { parse_port(start, spec)? };
                    let end = if end.is_empty() { MAX_PORT } else { parse_port(end, spec)? };
                    (start, end)
                }
                None => {
                    let port = parse_port(&item, spec)?;
                    (port, port)
                }
            };

            if start > end {
                return Err(DataConnectionError::InvalidPortSpec(format!(
                    "reversed range {} in \"{}\"",
                    item, spec
                )));
            }

            for port in start..=end {
                // Range bounds were validated against MAX_PORT.
                let port = port as u16;
                if !ports.contains(&port) {
                    ports.push(port);
                }
            }
        }

        if ports.is_empty() {
            return Err(DataConnectionError::InvalidPortSpec(format!(
                "no ports in \"{}\"",
                spec
            )));
        }

        Ok(Self::from_ports(ports))
    }

    /// Builds a pool from an explicit list, dropping duplicates but keeping order.
    pub fn from_ports(ports: impl IntoIterator<Item = u16>) -> Self {
        let mut unique: Vec<u16> = Vec::new();
        for port in ports {
            if !unique.contains(&port) {
                unique.push(port);
            }
        }
        let reserved = vec![false; unique.len()];
        Self {
            ports: unique,
            reserved,
        }
    }

    /// Reserves the first free port in configuration order.
    pub fn try_reserve(&mut self) -> Option<u16> {
        for (index, port) in self.ports.iter().enumerate() {
            if *port == 0 {
                return Some(0);
            }
            if !self.reserved[index] {
                self.reserved[index] = true;
                return Some(*port);
            }
        }
        None
    }

    /// Returns `port` to the pool. Ports outside the pool, port `0` and ports that are
    /// already free are ignored; the return value tells whether a reservation ended.
    pub fn release(&mut self, port: u16) -> bool {
        if port == 0 {
            return false;
        }
        match self.ports.iter().position(|p| *p == port) {
            Some(index) if self.reserved[index] => {
                self.reserved[index] = false;
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, port: u16) -> bool {
        self.ports.contains(&port)
    }

    pub fn is_reserved(&self, port: u16) -> bool {
        self.ports
            .iter()
            .position(|p| *p == port)
            .map(|index| self.reserved[index])
            .unwrap_or(false)
    }

    pub fn reserved_count(&self) -> usize {
        self.reserved.iter().filter(|r| **r).count()
    }

    pub fn free_count(&self) -> usize {
        self.ports.len() - self.reserved_count()
    }

    /// Range/list notation of the configured set, e.g. `2300-2400,2500`.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

fn parse_port(value: &str, spec: &str) -> Result<u32, DataConnectionError> {
    match value.parse::<u32>() {
        Ok(port) if port <= MAX_PORT => Ok(port),
        _ => Err(DataConnectionError::InvalidPortSpec(format!(
            "invalid port \"{}\" in \"{}\"",
            value, spec
        ))),
    }
}

impl fmt::Display for PassivePorts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut index = 0;
        while index < self.ports.len() {
            let start = self.ports[index];
            let mut end = start;
            while index + 1 < self.ports.len()
                && start != 0
                && self.ports[index + 1] != 0
                && u32::from(self.ports[index + 1]) == u32::from(end) + 1
            {
                index += 1;
                end = self.ports[index];
            }

            if !first {
                write!(f, ",")?;
            }
            first = false;

            if start == end {
                write!(f, "{}", start)?;
            } else {
                write!(f, "{}-{}", start, end)?;
            }
            index += 1;
        }
        Ok(())
    }
}
