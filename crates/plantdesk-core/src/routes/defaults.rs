//! Built-in route table for the plant operations app.

use super::{RouteDescriptor, RouteRegistry};

pub fn default_routes() -> Vec<RouteDescriptor> {
    vec![
        RouteDescriptor::public("/auth/login"),
        RouteDescriptor::public("/auth/forgot-password"),
        RouteDescriptor::protected("/dashboard").workspace("dashboard"),
        RouteDescriptor::protected("/shift-sample").workspace("shift-sample"),
        RouteDescriptor::protected("/shift-log")
            .roles(["Shift Supervisor", "Operator"])
            .workspace("shift-log"),
        RouteDescriptor::protected("/production/downtime"),
        RouteDescriptor::protected("/quality/lab-results")
            .roles(["Quality Engineer", "Lab Technician"])
            .workspace("quality"),
        RouteDescriptor::protected("/maintenance/work-orders")
            .roles(["Maintenance Planner", "Maintenance Technician"])
            .workspace("maintenance"),
        RouteDescriptor::protected("/reports/daily")
            .roles(["Plant Manager", "Shift Supervisor"])
            .workspace("reports"),
        RouteDescriptor::protected("/admin/users")
            .roles(["Administrator"])
            .workspace("admin"),
        RouteDescriptor::protected("/legacy/batch-entry").inactive(),
    ]
}

pub fn default_registry() -> RouteRegistry {
    RouteRegistry::new(default_routes())
}
