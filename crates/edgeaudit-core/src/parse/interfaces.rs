// `show interface status` table parsing.

use crate::model::InterfaceStatus;

/// Status words IOS prints in the Status column.
const KNOWN_STATUSES: &[&str] = &[
    "connected",
    "notconnect",
    "disabled",
    "err-disabled",
    "inactive",
    "monitoring",
    "suspended",
    "sfpAbsent",
    "xcvrAbsent",
    "noOperMem",
];

/// Parse the interface status table into `{port, status}` rows in device order.
///
/// Column positions come from the header line, so descriptions with spaces
/// in the Name column don't shift the Status column. Rows whose status
/// can't be located are dropped. No header means an empty list.
pub fn parse_interface_status(text: &str) -> Vec<InterfaceStatus> {
    let mut lines = text.lines();
    let Some(status_col) = lines.by_ref().find_map(status_column) else {
        return Vec::new();
    };

    lines
        .filter(|line| line.starts_with(|c: char| !c.is_whitespace()))
        .filter_map(|line| parse_row(line, status_col))
        .collect()
}

/// Byte offset of the Status column if `line` is the table header.
fn status_column(line: &str) -> Option<usize> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("Port") {
        return None;
    }
    if !tokens.any(|t| t == "Status") {
        return None;
    }
    line.find("Status")
}

fn parse_row(line: &str, status_col: usize) -> Option<InterfaceStatus> {
    let port = line.split_whitespace().next()?;

    let aligned = line
        .get(..status_col)
        .filter(|head| head.ends_with(char::is_whitespace))
        .and_then(|_| line.get(status_col..))
        .and_then(|tail| tail.split_whitespace().next());

    let status = match aligned {
        Some(status) => status,
        // Name overflowed into the Status column: fall back to the first
        // recognizable status word after the port.
        None => line
            .split_whitespace()
            .skip(1)
            .find(|t| KNOWN_STATUSES.contains(t))?,
    };

    Some(InterfaceStatus::new(port, status))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(port: &str, name: &str, status: &str) -> String {
        format!("{port:<13}{name:<19}{status:<13}{:<11}{:<8}{:<6}{}", "1", "a-full", "a-1000", "10/100/1000BaseTX")
    }

    fn table(rows: &[(&str, &str, &str)]) -> String {
        let mut out = vec![
            String::new(),
            format!("{:<13}{:<19}{:<13}{:<11}{:<8}{:<6}{}", "Port", "Name", "Status", "Vlan", "Duplex", "Speed", "Type"),
        ];
        out.extend(rows.iter().map(|(p, n, s)| row(p, n, s)));
        out.join("\n")
    }

    #[test]
    fn parses_rows_in_order() {
        let text = table(&[
            ("Gi0/1/0", "uplink to sw01", "connected"),
            ("Gi0/1/1", "", "notconnect"),
            ("Gi0/1/2", "", "notconnect"),
            ("Gi0/1/3", "", "notconnect"),
            ("Gi0/1/4", "PROVISIONING", "disabled"),
        ]);
        let rows = parse_interface_status(&text);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], InterfaceStatus::new("Gi0/1/0", "connected"));
        assert_eq!(rows[4], InterfaceStatus::new("Gi0/1/4", "disabled"));
    }

    #[test]
    fn description_with_status_word_does_not_confuse() {
        let text = table(&[("Gi0/1/4", "was disabled", "connected")]);
        let rows = parse_interface_status(&text);
        assert_eq!(rows, vec![InterfaceStatus::new("Gi0/1/4", "connected")]);
    }

    #[test]
    fn overflowing_name_falls_back_to_known_status() {
        let header = format!("{:<13}{:<19}{:<13}{}", "Port", "Name", "Status", "Vlan");
        let text = format!("{header}\nGi0/1/1      a-very-long-description-x notconnect 1\n");
        let rows = parse_interface_status(&text);
        assert_eq!(rows, vec![InterfaceStatus::new("Gi0/1/1", "notconnect")]);
    }

    #[test]
    fn no_header_is_empty() {
        assert!(parse_interface_status("").is_empty());
        assert!(parse_interface_status("% Invalid input detected at '^' marker.").is_empty());
    }

    #[test]
    fn ignores_prompt_and_continuation_lines() {
        let mut text = String::from("rtr01#show interface status\n");
        text.push_str(&table(&[("Gi0/1/0", "", "connected")]));
        text.push_str("\n   \n");
        let rows = parse_interface_status(&text);
        assert_eq!(rows, vec![InterfaceStatus::new("Gi0/1/0", "connected")]);
    }
}
