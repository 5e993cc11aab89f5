use crate::backend::ProcessingStep;
use std::time::{Duration, Instant};

/// Processing steps reported for the in-flight request.
///
/// Step `i` becomes visible `i * interval` after the steps arrive, so the
/// first step shows immediately.
#[derive(Debug, Clone, Default)]
pub struct StepProgress {
    steps: Vec<ProcessingStep>,
    received_at: Option<Instant>,
    interval: Duration,
}

impl StepProgress {
    pub fn new(interval: Duration) -> Self {
        Self {
            steps: Vec::new(),
            received_at: None,
            interval,
        }
    }

    pub fn record(&mut self, steps: Vec<ProcessingStep>, now: Instant) {
        self.steps = steps;
        self.received_at = Some(now);
    }

    pub fn all(&self) -> &[ProcessingStep] {
        &self.steps
    }

    pub fn visible(&self, now: Instant) -> &[ProcessingStep] {
        let Some(received_at) = self.received_at else {
            return &[];
        };

        if self.interval.is_zero() {
            return &self.steps;
        }

        let elapsed = now.saturating_duration_since(received_at);
        let revealed = (elapsed.as_nanos() / self.interval.as_nanos()) as usize + 1;
        &self.steps[..revealed.min(self.steps.len())]
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::StepId;

    fn steps(n: i64) -> Vec<ProcessingStep> {
        (1..=n)
            .map(|i| ProcessingStep {
                id: StepId::Number(i),
                icon: "⚙".into(),
                status: format!("step {}", i),
            })
            .collect()
    }

    #[test]
    fn test_nothing_visible_before_steps_arrive() {
        let progress = StepProgress::new(Duration::from_millis(600));
        assert!(progress.visible(Instant::now()).is_empty());
        assert!(progress.is_empty());
    }

    #[test]
    fn test_staged_reveal() {
        let mut progress = StepProgress::new(Duration::from_millis(600));
        let start = Instant::now();
        progress.record(steps(3), start);

        assert_eq!(progress.visible(start).len(), 1);
        assert_eq!(progress.visible(start + Duration::from_millis(599)).len(), 1);
        assert_eq!(progress.visible(start + Duration::from_millis(600)).len(), 2);
        assert_eq!(progress.visible(start + Duration::from_secs(10)).len(), 3);
        assert_eq!(progress.all().len(), 3);
    }

    #[test]
    fn test_zero_interval_reveals_all() {
        let mut progress = StepProgress::new(Duration::ZERO);
        let now = Instant::now();
        progress.record(steps(4), now);
        assert_eq!(progress.visible(now).len(), 4);
    }
}
