mod action;
mod association;
mod authentication;
mod beacon;
mod probe;

pub use action::{Action, ActionCategory};
pub use association::{
    AssociationRequest, AssociationResponse, Disassociation, ReassociationRequest,
    ReassociationResponse,
};
pub use authentication::{reason_code_is_valid, Authentication, Deauthentication, ReasonCode};
pub use beacon::{Atim, Beacon, CapabilityInfo};
pub use probe::{ProbeRequest, ProbeResponse};
