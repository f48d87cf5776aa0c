use std::fmt;

/// The three data-collection pages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    DatesAndGuests,
    Package,
    Contact,
}

impl WizardStep {
    pub fn all() -> &'static [WizardStep] {
        &[
            WizardStep::DatesAndGuests,
            WizardStep::Package,
            WizardStep::Contact,
        ]
    }

    pub fn number(&self) -> u8 {
        match self {
            WizardStep::DatesAndGuests => 1,
            WizardStep::Package => 2,
            WizardStep::Contact => 3,
        }
    }

    pub fn from_number(number: u8) -> Option<WizardStep> {
        WizardStep::all()
            .iter()
            .copied()
            .find(|step| step.number() == number)
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::DatesAndGuests => "Dates & Guests",
            WizardStep::Package => "Package",
            WizardStep::Contact => "Contact",
        }
    }

    pub fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::DatesAndGuests => Some(WizardStep::Package),
            WizardStep::Package => Some(WizardStep::Contact),
            WizardStep::Contact => None,
        }
    }

    pub fn prev(&self) -> Option<WizardStep> {
        match self {
            WizardStep::DatesAndGuests => None,
            WizardStep::Package => Some(WizardStep::DatesAndGuests),
            WizardStep::Contact => Some(WizardStep::Package),
        }
    }
}

/// Where an open wizard currently is.
///
/// `Submitting` and `SubmitFailed` are only ever entered from `Step3` and
/// display as the contact step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Step1,
    Step2,
    Step3,
    Submitting,
    Success,
    SubmitFailed,
}

impl WizardState {
    pub fn at(step: WizardStep) -> WizardState {
        match step {
            WizardStep::DatesAndGuests => WizardState::Step1,
            WizardStep::Package => WizardState::Step2,
            WizardStep::Contact => WizardState::Step3,
        }
    }

    /// The page rendered for this state; `None` once the enquiry succeeded.
    pub fn step(&self) -> Option<WizardStep> {
        match self {
            WizardState::Step1 => Some(WizardStep::DatesAndGuests),
            WizardState::Step2 => Some(WizardStep::Package),
            WizardState::Step3 | WizardState::Submitting | WizardState::SubmitFailed => {
                Some(WizardStep::Contact)
            }
            WizardState::Success => None,
        }
    }

    /// Target of a "Next" press, when one exists.
    pub fn advance_target(&self) -> Option<WizardState> {
        match self {
            WizardState::Step1 => Some(WizardState::Step2),
            WizardState::Step2 => Some(WizardState::Step3),
            _ => None,
        }
    }

    /// Target of a "Back" press, when one exists.
    pub fn back_target(&self) -> Option<WizardState> {
        match self {
            WizardState::Step2 => Some(WizardState::Step1),
            WizardState::Step3 | WizardState::SubmitFailed => Some(WizardState::Step2),
            _ => None,
        }
    }

    /// States from which a new submission attempt may start.
    pub fn accepts_submit(&self) -> bool {
        matches!(self, WizardState::Step3 | WizardState::SubmitFailed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WizardState::Success)
    }
}

impl fmt::Display for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardState::Step1 => "Step1",
            WizardState::Step2 => "Step2",
            WizardState::Step3 => "Step3",
            WizardState::Submitting => "Submitting",
            WizardState::Success => "Success",
            WizardState::SubmitFailed => "SubmitFailed",
        };
        f.write_str(name)
    }
}
