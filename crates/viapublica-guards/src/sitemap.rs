//! Site map
//!
//! Every navigable path, whether it is public, and which capability gates it.
//! Navigation menus are derived from the same table as the guards, so a menu
//! entry is shown exactly when its view would grant.

use crate::config::GuardConfig;
use crate::guard::AccessGuard;
use serde::Serialize;
use viapublica_core::{capability_for, Capability, Result, Session, ViaPublicaError};

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "capability")]
pub enum Access {
    /// Anyone, signed in or not
    Public,
    /// Sessions whose role holds the capability
    Requires(Capability),
}

/// One navigable view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Path pattern; `:name` segments match any single segment.
    pub path: &'static str,
    /// Menu and page title
    pub title: &'static str,
    /// Who may open it
    pub access: Access,
    /// Listed in the signed-in navigation menu.
    pub in_menu: bool,
}

impl Route {
    const fn public(path: &'static str, title: &'static str) -> Self {
        Self {
            path,
            title,
            access: Access::Public,
            in_menu: false,
        }
    }

    const fn gated(path: &'static str, title: &'static str, cap: Capability, in_menu: bool) -> Self {
        Self {
            path,
            title,
            access: Access::Requires(cap),
            in_menu,
        }
    }

    /// Capability required to open this route, if any.
    pub fn required(&self) -> Option<Capability> {
        match self.access {
            Access::Public => None,
            Access::Requires(cap) => Some(cap),
        }
    }

    /// `true` if `path` matches this route's pattern.
    pub fn matches(&self, path: &str) -> bool {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = if path.len() > 1 { path.trim_end_matches('/') } else { path };
        let mut pattern = self.path.split('/');
        let mut actual = path.split('/');
        loop {
            match (pattern.next(), actual.next()) {
                (None, None) => return true,
                (Some(p), Some(a)) if p.starts_with(':') && !a.is_empty() => continue,
                (Some(p), Some(a)) if p == a => continue,
                _ => return false,
            }
        }
    }
}

/// All routes, public first.
pub static ROUTES: &[Route] = &[
    Route::public("/", "Inicio"),
    Route::public("/catalogo", "Catálogo"),
    Route::public("/catalogo/:id", "Detalle de espacio"),
    Route::public("/auth/login", "Iniciar sesión"),
    Route::public("/auth/register", "Crear cuenta"),
    Route::public("/auth/verification-sent", "Verificación enviada"),
    Route::public("/acceso-denegado", "Acceso denegado"),
    Route::public("/publicar/proposito", "Publicar"),
    Route::public("/publicar/dueno", "Publicar como dueño"),
    Route::public("/publicar/agencia", "Publicar como agencia"),
    Route::public("/publicar/precios", "Precios"),
    Route::gated("/perfil", "Mi perfil", Capability::ViewCatalog, true),
    Route::gated("/favoritos", "Favoritos", Capability::SaveFavorites, true),
    Route::gated("/mensajes", "Mensajes", Capability::ContactOwners, false),
    Route::gated("/mis-carteles", "Mis carteles", Capability::PublishBillboards, false),
    Route::gated("/mis-espacios", "Mis espacios", Capability::PublishBillboards, true),
    Route::gated("/mis-espacios/:id", "Editar espacio", Capability::PublishBillboards, false),
    Route::gated("/publicar-cartel", "Publicar cartel", Capability::PublishBillboards, false),
    Route::gated("/publicar-espacio", "Publicar espacio", Capability::PublishBillboards, true),
    Route::gated("/plan-servicio", "Plan de servicio", Capability::PublishBillboards, false),
    Route::gated("/informes", "Informes", Capability::PublishBillboards, false),
    Route::gated("/mi-agencia", "Mi agencia", Capability::PublishBillboards, false),
    Route::gated("/descargas", "Descargas", Capability::PublishBillboards, false),
    Route::gated("/consultas-recibidas", "Consultas", Capability::ViewInquiries, true),
    Route::gated("/admin", "Administración", Capability::AccessAdminPanel, true),
];

/// Route matching `path`, if any.
pub fn route(path: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|r| r.matches(path))
}

/// Guard for `path`; `None` for public routes.
pub fn guard_for(path: &str, config: &GuardConfig) -> Result<Option<AccessGuard>> {
    config.validate()?;
    let route = route(path).ok_or_else(|| ViaPublicaError::not_found(format!("no route for '{path}'")))?;
    Ok(route
        .required()
        .map(|cap| AccessGuard::with_config(cap, config.clone())))
}

/// Menu entries visible to `session`. Anonymous visitors get none.
pub fn menu_for(session: Option<&Session>) -> Vec<&'static Route> {
    let Some(session) = session else {
        return Vec::new();
    };
    let role = session.role();
    ROUTES
        .iter()
        .filter(|r| r.in_menu)
        .filter(|r| r.required().map_or(true, |cap| capability_for(role, cap)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use viapublica_core::Role;

    #[test]
    fn parameter_segments_match_one_segment() {
        let detail = route("/mis-espacios/42").unwrap();
        assert_eq!(detail.required(), Some(Capability::PublishBillboards));
        assert_eq!(detail.path, "/mis-espacios/:id");
        assert!(route("/mis-espacios/42/extra").is_none());
        assert_eq!(route("/mis-espacios/").unwrap().path, "/mis-espacios");
    }

    #[test]
    fn query_strings_are_ignored() {
        assert_eq!(route("/favoritos?orden=reciente").unwrap().path, "/favoritos");
        assert_eq!(route("/").unwrap().access, Access::Public);
    }

    #[test]
    fn unknown_paths_are_not_found() {
        let err = guard_for("/nada", &GuardConfig::default()).unwrap_err();
        assert!(matches!(err, ViaPublicaError::NotFound { .. }));
    }

    #[test]
    fn public_routes_have_no_guard() {
        assert!(guard_for("/catalogo/7", &GuardConfig::default()).unwrap().is_none());
        let guard = guard_for("/admin", &GuardConfig::default()).unwrap().unwrap();
        assert_eq!(guard.required(), Capability::AccessAdminPanel);
    }

    #[test]
    fn standard_user_menu() {
        let user = Session::builder("Ana", "ana@example.com", Role::StandardUser)
            .build()
            .unwrap();
        let paths: Vec<_> = menu_for(Some(&user)).iter().map(|r| r.path).collect();
        assert_eq!(paths, ["/perfil", "/favoritos"]);
        assert!(menu_for(None).is_empty());
    }
}
