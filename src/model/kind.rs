use crate::define_id_enum;

define_id_enum! {
    /// Closed set of container-managed component variants
    ComponentKind {
        Servlet => "servlet" : "Servlet" | "HttpServlet",
        Filter => "filter" : "Filter",
        Listener => "listener" : "Listener",
        /// Struts 1 front controller; a servlet that also owns action mappings
        ActionServlet => "action-servlet" : "ActionServlet" | "ActionController",
    }
}

define_id_enum! {
    /// Position of a component in the container's start-up and dispatch sequence
    LifecycleRole {
        Listener => "listener" : "Listener",
        Filter => "filter" : "Filter",
        Dispatch => "dispatch" : "Dispatch",
    }
}

impl ComponentKind {
    /// The kind this one specializes, if any
    pub fn parent(&self) -> Option<ComponentKind> {
        match self {
            ComponentKind::ActionServlet => Some(ComponentKind::Servlet),
            ComponentKind::Servlet | ComponentKind::Filter | ComponentKind::Listener => None,
        }
    }

    /// True when `self` is a strict specialization of `other`
    pub fn refines(&self, other: ComponentKind) -> bool {
        let mut current = self.parent();
        while let Some(kind) = current {
            if kind == other {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    pub fn role(&self) -> LifecycleRole {
        match self {
            ComponentKind::Listener => LifecycleRole::Listener,
            ComponentKind::Filter => LifecycleRole::Filter,
            ComponentKind::Servlet | ComponentKind::ActionServlet => LifecycleRole::Dispatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refinement() {
        assert!(ComponentKind::ActionServlet.refines(ComponentKind::Servlet));
        assert!(!ComponentKind::Servlet.refines(ComponentKind::ActionServlet));
        assert!(!ComponentKind::Servlet.refines(ComponentKind::Servlet));
        assert!(!ComponentKind::Filter.refines(ComponentKind::Servlet));
    }

    #[test]
    fn test_roles_are_ordered_by_container_startup() {
        assert!(LifecycleRole::Listener < LifecycleRole::Filter);
        assert!(LifecycleRole::Filter < LifecycleRole::Dispatch);
        assert_eq!(ComponentKind::ActionServlet.role(), LifecycleRole::Dispatch);
        assert_eq!(ComponentKind::Listener.role(), LifecycleRole::Listener);
    }

    #[test]
    fn test_names() {
        assert_eq!(ComponentKind::ActionServlet.name(), "ActionServlet");
        assert_eq!(
            ComponentKind::from_name("ActionController"),
            Some(ComponentKind::ActionServlet)
        );
        assert_eq!(ComponentKind::from_name("Portlet"), None);
        assert_eq!(ComponentKind::all_variants().len(), 4);
    }

    #[test]
    fn test_serde_round_trip_names() {
        let json = serde_json::to_string(&ComponentKind::ActionServlet).unwrap();
        assert_eq!(json, "\"action-servlet\"");
        let kind: ComponentKind = serde_json::from_str("\"Filter\"").unwrap();
        assert_eq!(kind, ComponentKind::Filter);
        assert!(serde_json::from_str::<ComponentKind>("\"portlet\"").is_err());
    }
}
