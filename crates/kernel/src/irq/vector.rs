//! The trap causes a processor can enter the kernel for, and the uniform
//! severity each is given before falling into [`crate::error::Severity`]
//! dispatch (spec §4.6/§7).

use crate::error::KernelError;
use crate::mapping::IrqId;

#[derive(Clone, Copy, Debug)]
pub enum Vector {
    Syscall(u32),
    ExternalIrq(IrqId),
    PageFault,
    Unknown(u32),
}

/// What the trap entry should do after a vector has been handled.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TrapOutcome {
    Resume,
    KillThread,
    Halt,
}

pub fn outcome_for(result: &Result<(), KernelError>) -> TrapOutcome {
    use crate::error::{ErrorSeverity, Severity};

    match result {
        Ok(()) => TrapOutcome::Resume,
        Err(e) => match e.severity() {
            ErrorSeverity::FatalKernel => TrapOutcome::Halt,
            ErrorSeverity::FatalThread => TrapOutcome::KillThread,
            ErrorSeverity::RecoverableDriver | ErrorSeverity::Transient => TrapOutcome::Resume,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MappingError;

    #[test]
    fn fatal_kernel_error_halts() {
        let result: Result<(), KernelError> = Err(MappingError::BadSignature.into());
        assert_eq!(outcome_for(&result), TrapOutcome::Halt);
    }

    #[test]
    fn ok_result_resumes() {
        let result: Result<(), KernelError> = Ok(());
        assert_eq!(outcome_for(&result), TrapOutcome::Resume);
    }
}
