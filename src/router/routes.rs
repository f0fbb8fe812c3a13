use crate::types::Role;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/dashboard";

const EVERYONE: &[Role] = &Role::ALL;
const BIODIVERSITY_VIEWERS: &[Role] = &[
    Role::EcologicalMonitor,
    Role::DataAnalyst,
    Role::ParkManager,
    Role::SystemAdministrator,
];

/// Static metadata for one navigable location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub path: &'static str,
    pub name: &'static str,
    pub title: Option<&'static str>,
    /// Defaults to `true`.
    pub requires_auth: bool,
    /// Empty means any authenticated role.
    pub allowed_roles: &'static [Role],
    /// Static alias: navigating here continues to this path.
    pub redirect: Option<&'static str>,
}

impl RouteDescriptor {
    #[must_use]
    pub const fn new(path: &'static str, name: &'static str) -> Self {
        Self {
            path,
            name,
            title: None,
            requires_auth: true,
            allowed_roles: &[],
            redirect: None,
        }
    }

    #[must_use]
    pub const fn public(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    #[must_use]
    pub const fn titled(mut self, title: &'static str) -> Self {
        self.title = Some(title);
        self
    }

    #[must_use]
    pub const fn roles(mut self, roles: &'static [Role]) -> Self {
        self.allowed_roles = roles;
        self
    }

    #[must_use]
    pub const fn redirect_to(mut self, path: &'static str) -> Self {
        self.redirect = Some(path);
        self
    }

    /// Whether `role` passes this route's role restriction.
    ///
    /// Unrestricted routes admit everyone; restricted ones never admit `None`.
    #[must_use]
    pub fn admits(&self, role: Option<Role>) -> bool {
        self.allowed_roles.is_empty()
            || role.is_some_and(|role| self.allowed_roles.contains(&role))
    }
}

/// The console's route table. Built once, immutable afterwards.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
    fallback: RouteDescriptor,
    login_path: &'static str,
    home_path: &'static str,
}

impl RouteTable {
    /// `fallback` is used for any path with no entry.
    #[must_use]
    pub fn new(routes: Vec<RouteDescriptor>, fallback: RouteDescriptor) -> Self {
        Self {
            routes,
            fallback,
            login_path: LOGIN_PATH,
            home_path: HOME_PATH,
        }
    }

    #[must_use]
    pub fn with_login_path(mut self, path: &'static str) -> Self {
        self.login_path = path;
        self
    }

    /// Change the home route. Aliases that pointed at the old home route
    /// (such as `/`) follow it.
    #[must_use]
    pub fn with_home_path(mut self, path: &'static str) -> Self {
        let previous = std::mem::replace(&mut self.home_path, path);
        for route in &mut self.routes {
            if route.redirect == Some(previous) {
                route.redirect = Some(path);
            }
        }
        self
    }

    /// Routes of the protected-area management console.
    #[must_use]
    pub fn standard() -> Self {
        use Role::*;

        let routes = vec![
            RouteDescriptor::new("/login", "Login").public(),
            RouteDescriptor::new("/", "MainLayout").redirect_to(HOME_PATH),
            RouteDescriptor::new("/dashboard", "Dashboard")
                .titled("仪表盘")
                .roles(EVERYONE),
            // Biodiversity
            RouteDescriptor::new("/biodiversity/species", "SpeciesManagement")
                .titled("物种管理")
                .roles(BIODIVERSITY_VIEWERS),
            RouteDescriptor::new("/biodiversity/habitat", "HabitatManagement")
                .titled("栖息地管理")
                .roles(BIODIVERSITY_VIEWERS),
            RouteDescriptor::new("/biodiversity/monitoring", "MonitoringRecord")
                .titled("监测记录")
                .roles(BIODIVERSITY_VIEWERS),
            // Environment
            RouteDescriptor::new("/environment/devices", "DeviceManagement")
                .titled("设备管理")
                .roles(&[Technician, ParkManager, SystemAdministrator]),
            RouteDescriptor::new("/environment/data", "EnvironmentalData")
                .titled("环境数据")
                .roles(BIODIVERSITY_VIEWERS),
            RouteDescriptor::new("/environment/indicators", "IndicatorManagement")
                .titled("指标管理")
                .roles(&[DataAnalyst, SystemAdministrator]),
            // Visitors
            RouteDescriptor::new("/visitor/list", "VisitorList")
                .titled("游客列表")
                .roles(&[ParkManager, SystemAdministrator]),
            RouteDescriptor::new("/visitor/reservation", "ReservationManagement")
                .titled("预约管理")
                .roles(&[Visitor, ParkManager, SystemAdministrator]),
            RouteDescriptor::new("/visitor/traffic", "TrafficControl")
                .titled("流量控制")
                .roles(&[ParkManager, SystemAdministrator]),
            RouteDescriptor::new("/visitor/trajectory", "VisitorTrajectory")
                .titled("游客轨迹")
                .roles(&[LawEnforcer, ParkManager, SystemAdministrator]),
            // Enforcement
            RouteDescriptor::new("/enforcement/illegal", "IllegalBehavior")
                .titled("违法行为")
                .roles(&[LawEnforcer, ParkManager, SystemAdministrator]),
            RouteDescriptor::new("/enforcement/dispatch", "EnforcementDispatch")
                .titled("执法调度")
                .roles(&[LawEnforcer, ParkManager, SystemAdministrator]),
            RouteDescriptor::new("/enforcement/surveillance", "SurveillancePoint")
                .titled("监控点管理")
                .roles(&[Technician, LawEnforcer, ParkManager, SystemAdministrator]),
            // Research
            RouteDescriptor::new("/research/projects", "ResearchProject")
                .titled("科研项目")
                .roles(&[Researcher, ParkManager, SystemAdministrator]),
            RouteDescriptor::new("/research/data-collection", "DataCollection")
                .titled("数据采集")
                .roles(&[Researcher, SystemAdministrator]),
            RouteDescriptor::new("/research/achievements", "ResearchAchievement")
                .titled("科研成果")
                .roles(&[Researcher, ParkManager, SystemAdministrator]),
            // System
            RouteDescriptor::new("/system/users", "UserManagement")
                .titled("用户管理")
                .roles(&[SystemAdministrator]),
            RouteDescriptor::new("/system/areas", "AreaManagement")
                .titled("区域管理")
                .roles(&[SystemAdministrator]),
        ];

        Self::new(routes, RouteDescriptor::new("/:pathMatch(.*)*", "NotFound"))
    }

    /// Descriptor for `path`, ignoring query, fragment and a trailing slash.
    #[must_use]
    pub fn resolve(&self, path: &str) -> &RouteDescriptor {
        let path = normalize(path);
        self.routes
            .iter()
            .find(|route| route.path == path)
            .unwrap_or(&self.fallback)
    }

    #[must_use]
    pub fn login_path(&self) -> &'static str {
        self.login_path
    }

    #[must_use]
    pub fn home_path(&self) -> &'static str {
        self.home_path
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.routes.iter()
    }

    /// Titled pages `role` may open, in table order. Used to build menus.
    #[must_use]
    pub fn menu_for(&self, role: Option<Role>) -> Vec<&RouteDescriptor> {
        self.routes
            .iter()
            .filter(|route| route.title.is_some() && route.requires_auth)
            .filter(|route| role.is_some() && route.admits(role))
            .collect()
    }
}

fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}
