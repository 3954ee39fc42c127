use crate::question::choice::unmatched;
use crate::question::row::{AnswerField, RowError};
use crate::question::{Answers, DomainError};

/// Integer in `[low, high]` plus a flag recording whether the user set it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slider {
    low: i64,
    high: i64,
    value: i64,
    moved: bool,
}

impl Slider {
    pub fn new(low: i64, high: i64) -> Result<Self, DomainError> {
        check_bounds(low, high)?;
        Ok(Self {
            low,
            high,
            value: low,
            moved: false,
        })
    }

    pub fn bounds(&self) -> (i64, i64) {
        (self.low, self.high)
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn is_moved(&self) -> bool {
        self.moved
    }

    /// Accept the current value as the answer without changing it.
    pub fn mark_moved(&mut self) {
        self.moved = true;
    }

    /// Absent until moved, whatever the value.
    pub fn answers(&self) -> Answers {
        if self.moved {
            vec![Some(self.value.to_string())]
        } else {
            vec![None]
        }
    }

    /// Same effect as the user dragging the handle to `value`.
    pub fn set_answer(&mut self, value: i64) -> Result<(), DomainError> {
        if !(self.low..=self.high).contains(&value) {
            return Err(DomainError::OutOfRange {
                value,
                low: self.low,
                high: self.high,
            });
        }
        self.value = value;
        self.moved = true;
        Ok(())
    }

    pub fn set_low(&mut self, low: i64) -> Result<(), DomainError> {
        self.set_bounds(low, self.high)
    }

    pub fn set_high(&mut self, high: i64) -> Result<(), DomainError> {
        self.set_bounds(self.low, high)
    }

    /// Keeps the value when still in range, else resets to `low` and clears the moved flag.
    pub fn set_bounds(&mut self, low: i64, high: i64) -> Result<(), DomainError> {
        check_bounds(low, high)?;
        self.low = low;
        self.high = high;
        if !(low..=high).contains(&self.value) {
            self.value = low;
            self.moved = false;
        }
        Ok(())
    }

    pub(crate) fn apply_answer(&mut self, field: AnswerField<'_>) -> Result<(), RowError> {
        match field {
            AnswerField::Unanswered => {
                self.moved = false;
                Ok(())
            }
            AnswerField::Marked(raw) => parse_number(raw)
                .and_then(|value| self.set_answer(value))
                .map_err(|reason| unmatched(raw, reason)),
        }
    }
}

/// Stepped rating: answers lie on `low, low + step, ...` up to `high`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingScale {
    low: i64,
    high: i64,
    step: i64,
    selected: Option<i64>,
}

impl RatingScale {
    pub fn new(low: i64, high: i64, step: i64) -> Result<Self, DomainError> {
        check_scale(low, high, step)?;
        Ok(Self {
            low,
            high,
            step,
            selected: None,
        })
    }

    pub fn range(&self) -> (i64, i64) {
        (self.low, self.high)
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    /// Selectable values in ascending order, computed lazily.
    pub fn lattice(&self) -> impl Iterator<Item = i64> + use<> {
        let (high, step) = (self.high, self.step);
        std::iter::successors(Some(self.low), move |value| {
            value.checked_add(step).filter(|next| *next <= high)
        })
    }

    pub fn contains(&self, value: i64) -> bool {
        on_lattice(value, self.low, self.high, self.step)
    }

    pub fn answers(&self) -> Answers {
        vec![self.selected.map(|value| value.to_string())]
    }

    pub fn set_answer(&mut self, value: i64) -> Result<(), DomainError> {
        if !(self.low..=self.high).contains(&value) {
            return Err(DomainError::OutOfRange {
                value,
                low: self.low,
                high: self.high,
            });
        }
        if !self.contains(value) {
            return Err(DomainError::OffLattice {
                value,
                low: self.low,
                step: self.step,
            });
        }
        self.selected = Some(value);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn set_low(&mut self, low: i64) -> Result<(), DomainError> {
        self.set_scale(low, self.high, self.step)
    }

    pub fn set_high(&mut self, high: i64) -> Result<(), DomainError> {
        self.set_scale(self.low, high, self.step)
    }

    pub fn set_step(&mut self, step: i64) -> Result<(), DomainError> {
        self.set_scale(self.low, self.high, step)
    }

    /// Rebuilds the lattice; an answer that falls off it is dropped.
    pub fn set_scale(&mut self, low: i64, high: i64, step: i64) -> Result<(), DomainError> {
        check_scale(low, high, step)?;
        self.low = low;
        self.high = high;
        self.step = step;
        if let Some(value) = self.selected
            && !on_lattice(value, low, high, step)
        {
            self.selected = None;
        }
        Ok(())
    }

    pub(crate) fn apply_answer(&mut self, field: AnswerField<'_>) -> Result<(), RowError> {
        match field {
            AnswerField::Unanswered => Ok(()),
            AnswerField::Marked(raw) => parse_number(raw)
                .and_then(|value| self.set_answer(value))
                .map_err(|reason| unmatched(raw, reason)),
        }
    }
}

fn on_lattice(value: i64, low: i64, high: i64, step: i64) -> bool {
    (low..=high).contains(&value) && (i128::from(value) - i128::from(low)) % i128::from(step) == 0
}

fn check_bounds(low: i64, high: i64) -> Result<(), DomainError> {
    if low > high {
        return Err(DomainError::Bounds(format!(
            "low bound {} exceeds high bound {}",
            low, high
        )));
    }
    Ok(())
}

fn check_scale(low: i64, high: i64, step: i64) -> Result<(), DomainError> {
    check_bounds(low, high)?;
    if step < 1 {
        return Err(DomainError::Bounds(format!(
            "step must be at least 1, found {}",
            step
        )));
    }
    Ok(())
}

fn parse_number(raw: &str) -> Result<i64, DomainError> {
    raw.trim()
        .parse()
        .map_err(|_| DomainError::NotANumber(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_is_absent_until_moved() {
        let mut slider = Slider::new(1, 5).unwrap();
        assert_eq!(slider.value(), 1);
        assert_eq!(slider.answers(), vec![None]);
        slider.mark_moved();
        assert_eq!(slider.answers(), vec![Some("1".to_string())]);
    }

    #[test]
    fn slider_bounds_answers() {
        let mut slider = Slider::new(1, 5).unwrap();
        assert!(matches!(
            slider.set_answer(6),
            Err(DomainError::OutOfRange { value: 6, .. })
        ));
        assert!(!slider.is_moved());
        slider.set_answer(3).unwrap();
        assert_eq!(slider.answers(), vec![Some("3".to_string())]);
    }

    #[test]
    fn slider_reconfiguration_resets_out_of_range_value() {
        let mut slider = Slider::new(0, 10).unwrap();
        slider.set_answer(8).unwrap();
        slider.set_low(2).unwrap();
        assert_eq!(slider.value(), 8);
        assert!(slider.is_moved());
        slider.set_high(6).unwrap();
        assert_eq!(slider.value(), 2);
        assert!(!slider.is_moved());
        assert!(slider.set_bounds(7, 3).is_err());
        assert_eq!(slider.bounds(), (2, 6));
    }

    #[test]
    fn rating_lattice_follows_step() {
        let rating = RatingScale::new(0, 10, 3).unwrap();
        assert_eq!(rating.lattice().collect::<Vec<_>>(), vec![0, 3, 6, 9]);
        assert!(rating.contains(9));
        assert!(!rating.contains(10));
    }

    #[test]
    fn rating_lattice_handles_extreme_ranges() {
        let wide = RatingScale::new(i64::MIN, i64::MAX, i64::MAX).unwrap();
        assert_eq!(
            wide.lattice().collect::<Vec<_>>(),
            vec![i64::MIN, -1, i64::MAX - 1]
        );

        let single = RatingScale::new(i64::MAX, i64::MAX, 1).unwrap();
        assert_eq!(single.lattice().collect::<Vec<_>>(), vec![i64::MAX]);

        let huge_step = RatingScale::new(0, 10, i64::MAX).unwrap();
        assert_eq!(huge_step.lattice().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn rating_rejects_off_lattice_values() {
        let mut rating = RatingScale::new(1, 9, 2).unwrap();
        assert!(matches!(
            rating.set_answer(4),
            Err(DomainError::OffLattice { value: 4, .. })
        ));
        assert!(matches!(
            rating.set_answer(11),
            Err(DomainError::OutOfRange { .. })
        ));
        rating.set_answer(5).unwrap();
        assert_eq!(rating.answers(), vec![Some("5".to_string())]);
    }

    #[test]
    fn rating_reconfiguration_drops_stale_answer() {
        let mut rating = RatingScale::new(1, 5, 1).unwrap();
        rating.set_answer(4).unwrap();
        rating.set_low(0).unwrap();
        rating.set_high(10).unwrap();
        assert_eq!(rating.selected(), Some(4));
        rating.set_step(3).unwrap();
        assert_eq!(rating.selected(), None);
        assert!(rating.set_step(0).is_err());
        assert_eq!(rating.step(), 3);
    }

    #[test]
    fn numeric_rows_reject_non_numbers() {
        let mut rating = RatingScale::new(1, 5, 1).unwrap();
        let err = rating.apply_answer(AnswerField::Marked("high")).unwrap_err();
        assert!(matches!(
            err,
            RowError::AnswerUnmatched {
                reason: DomainError::NotANumber(_),
                ..
            }
        ));
    }
}
