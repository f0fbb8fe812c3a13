//! Capability → role matrix for user-initiated actions.
//!
//! Consulted by presentation logic to decide whether to expose an action.
//! It is a UX gate only; the API enforces the real boundary.
//!
//! Every lookup fails closed: a missing role, an empty or unknown key, or a
//! role outside the registered set all answer `false`.

use crate::error::Error;
use crate::types::Role;

const MONITORING_STAFF: &[Role] = &[
    Role::EcologicalMonitor,
    Role::ParkManager,
    Role::SystemAdministrator,
];
const ANALYSTS: &[Role] = &[Role::DataAnalyst, Role::SystemAdministrator];
const TECHNICAL_STAFF: &[Role] = &[
    Role::Technician,
    Role::ParkManager,
    Role::SystemAdministrator,
];
const TECHNICIANS: &[Role] = &[Role::Technician, Role::SystemAdministrator];
const MANAGERS: &[Role] = &[Role::ParkManager, Role::SystemAdministrator];
const RESERVATION_MAKERS: &[Role] = &[
    Role::Visitor,
    Role::ParkManager,
    Role::SystemAdministrator,
];
const ENFORCERS: &[Role] = &[
    Role::LawEnforcer,
    Role::ParkManager,
    Role::SystemAdministrator,
];
const RESEARCH_LEADS: &[Role] = &[
    Role::Researcher,
    Role::ParkManager,
    Role::SystemAdministrator,
];
const RESEARCHERS: &[Role] = &[Role::Researcher, Role::SystemAdministrator];
const ADMINISTRATORS: &[Role] = &[Role::SystemAdministrator];

macro_rules! capabilities {
    ($($variant:ident => $key:literal : $roles:expr,)+) => {
        /// A user-initiated action gated by role.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[non_exhaustive]
        pub enum Capability {
            $($variant,)+
        }

        impl Capability {
            /// Every registered capability, in declaration order.
            pub const ALL: &'static [Capability] = &[$(Capability::$variant,)+];

            /// Dotted key, e.g. `"system.user.create"`.
            #[must_use]
            pub fn key(self) -> &'static str {
                match self {
                    $(Capability::$variant => $key,)+
                }
            }

            /// Roles allowed to exercise this capability.
            #[must_use]
            pub fn allowed_roles(self) -> &'static [Role] {
                match self {
                    $(Capability::$variant => $roles,)+
                }
            }
        }

        impl std::str::FromStr for Capability {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($key => Ok(Capability::$variant),)+
                    _ => Err(Error::UnknownCapability(s.to_owned())),
                }
            }
        }
    };
}

capabilities! {
    BiodiversitySpeciesCreate => "biodiversity.species.create": MONITORING_STAFF,
    BiodiversitySpeciesEdit => "biodiversity.species.edit": MONITORING_STAFF,
    BiodiversitySpeciesDelete => "biodiversity.species.delete": MONITORING_STAFF,
    BiodiversityHabitatCreate => "biodiversity.habitat.create": MONITORING_STAFF,
    BiodiversityHabitatEdit => "biodiversity.habitat.edit": MONITORING_STAFF,
    BiodiversityHabitatDelete => "biodiversity.habitat.delete": MONITORING_STAFF,
    BiodiversityMonitoringCreate => "biodiversity.monitoring.create": MONITORING_STAFF,
    BiodiversityMonitoringEdit => "biodiversity.monitoring.edit": MONITORING_STAFF,
    BiodiversityMonitoringDelete => "biodiversity.monitoring.delete": MONITORING_STAFF,
    BiodiversityMonitoringReview => "biodiversity.monitoring.review": ANALYSTS,

    EnvironmentDeviceCreate => "environment.device.create": TECHNICAL_STAFF,
    EnvironmentDeviceEdit => "environment.device.edit": TECHNICAL_STAFF,
    EnvironmentDeviceDelete => "environment.device.delete": TECHNICAL_STAFF,
    EnvironmentDeviceStatus => "environment.device.status": TECHNICAL_STAFF,
    EnvironmentIndicatorCreate => "environment.indicator.create": ANALYSTS,
    EnvironmentIndicatorEdit => "environment.indicator.edit": ANALYSTS,
    EnvironmentIndicatorDelete => "environment.indicator.delete": ANALYSTS,
    EnvironmentDataCreate => "environment.data.create": TECHNICIANS,

    VisitorListCreate => "visitor.list.create": MANAGERS,
    VisitorListEdit => "visitor.list.edit": MANAGERS,
    VisitorReservationCreate => "visitor.reservation.create": RESERVATION_MAKERS,
    VisitorReservationEdit => "visitor.reservation.edit": MANAGERS,
    VisitorReservationCancel => "visitor.reservation.cancel": MANAGERS,
    VisitorReservationComplete => "visitor.reservation.complete": MANAGERS,
    VisitorTrafficEdit => "visitor.traffic.edit": MANAGERS,
    VisitorTrajectoryCreate => "visitor.trajectory.create": MANAGERS,

    EnforcementIllegalCreate => "enforcement.illegal.create": ENFORCERS,
    EnforcementIllegalEdit => "enforcement.illegal.edit": ENFORCERS,
    EnforcementIllegalHandle => "enforcement.illegal.handle": ENFORCERS,
    EnforcementDispatchCreate => "enforcement.dispatch.create": MANAGERS,
    EnforcementDispatchEdit => "enforcement.dispatch.edit": MANAGERS,
    EnforcementDispatchComplete => "enforcement.dispatch.complete": ENFORCERS,
    EnforcementSurveillanceCreate => "enforcement.surveillance.create": TECHNICAL_STAFF,
    EnforcementSurveillanceEdit => "enforcement.surveillance.edit": TECHNICAL_STAFF,
    EnforcementSurveillanceDelete => "enforcement.surveillance.delete": TECHNICAL_STAFF,

    ResearchProjectCreate => "research.project.create": RESEARCH_LEADS,
    ResearchProjectEdit => "research.project.edit": RESEARCH_LEADS,
    ResearchProjectDelete => "research.project.delete": MANAGERS,
    ResearchDataCreate => "research.data.create": RESEARCHERS,
    ResearchDataEdit => "research.data.edit": RESEARCHERS,
    ResearchDataDelete => "research.data.delete": RESEARCHERS,
    ResearchAchievementCreate => "research.achievement.create": RESEARCHERS,
    ResearchAchievementEdit => "research.achievement.edit": RESEARCHERS,
    ResearchAchievementDelete => "research.achievement.delete": RESEARCHERS,

    SystemUserCreate => "system.user.create": ADMINISTRATORS,
    SystemUserEdit => "system.user.edit": ADMINISTRATORS,
    SystemUserDelete => "system.user.delete": ADMINISTRATORS,
    SystemAreaCreate => "system.area.create": ADMINISTRATORS,
    SystemAreaEdit => "system.area.edit": ADMINISTRATORS,
    SystemAreaDelete => "system.area.delete": ADMINISTRATORS,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Whether `role` may exercise `capability`. `None` is always a denial.
#[must_use]
pub fn can_role(role: Option<Role>, capability: Capability) -> bool {
    role.is_some_and(|role| capability.allowed_roles().contains(&role))
}

/// String-keyed form of [`can_role`] for callers holding raw labels.
///
/// Empty or unrecognised role labels and capability keys deny.
#[must_use]
pub fn can_role_key(role: &str, key: &str) -> bool {
    if role.is_empty() || key.is_empty() {
        return false;
    }
    match (role.parse::<Role>(), key.parse::<Capability>()) {
        (Ok(role), Ok(capability)) => can_role(Some(role), capability),
        _ => false,
    }
}

/// Every capability `role` may exercise, in declaration order.
#[must_use]
pub fn capabilities_of(role: Role) -> Vec<Capability> {
    Capability::ALL
        .iter()
        .copied()
        .filter(|capability| capability.allowed_roles().contains(&role))
        .collect()
}
