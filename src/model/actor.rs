use crate::util::jwt::Claims;

pub const ACTOR_SISTEMA: &str = "sistema";

/// Who is behind a request: an authenticated staff member, or nobody when
/// anonymous writes are allowed.
#[derive(Debug, Clone, PartialEq)]
pub enum Actor {
    Funcionario(Claims),
    Sistema,
}

impl Actor {
    /// Value recorded in `actualizado_por`.
    pub fn id(&self) -> &str {
        match self {
            Actor::Funcionario(claims) => &claims.sub,
            Actor::Sistema => ACTOR_SISTEMA,
        }
    }

    pub fn rol(&self) -> Option<&str> {
        match self {
            Actor::Funcionario(claims) => Some(&claims.role),
            Actor::Sistema => None,
        }
    }

    pub fn es_admin(&self) -> bool {
        matches!(self, Actor::Funcionario(claims) if claims.es_admin())
    }
}
