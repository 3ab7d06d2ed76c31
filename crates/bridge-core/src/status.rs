#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Downstream mirror status. Maps the upstream open/closed state onto the
/// downstream `State` field values.
pub enum MirrorStatus {
    Open,
    Done,
}

impl MirrorStatus {
    pub fn from_issue_state(state: &str) -> Self {
        if state.eq_ignore_ascii_case("closed") {
            Self::Done
        } else {
            Self::Open
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Done => "Done",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MirrorStatus;

    #[test]
    fn unit_mirror_status_maps_closed_to_done_and_everything_else_to_open() {
        assert_eq!(MirrorStatus::from_issue_state("closed"), MirrorStatus::Done);
        assert_eq!(MirrorStatus::from_issue_state("Closed"), MirrorStatus::Done);
        assert_eq!(MirrorStatus::from_issue_state("open"), MirrorStatus::Open);
        assert_eq!(MirrorStatus::from_issue_state(""), MirrorStatus::Open);
    }

    #[test]
    fn unit_mirror_status_renders_downstream_field_values() {
        assert_eq!(MirrorStatus::Open.as_str(), "Open");
        assert_eq!(MirrorStatus::Done.as_str(), "Done");
    }
}
