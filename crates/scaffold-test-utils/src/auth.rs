//! `Auth` entity: two required scalar fields

use scaffold_core::{async_trait, resolve_required, Builder, Node, ResolveError, Scaffold, Scope, Shell, Spec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Auth {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct AuthShell {
    pub username: Option<Node<String>>,
    pub password: Option<Node<String>>,
}

pub type AuthSpec<C> = Spec<AuthShell, C>;

#[async_trait]
impl Scaffold<Auth> for AuthShell {
    async fn resolve(&self, scope: &Scope) -> Result<Auth, ResolveError> {
        let username = resolve_required(self.username.as_ref(), scope, Self::ENTITY, "username").await?;
        let password = resolve_required(self.password.as_ref(), scope, Self::ENTITY, "password").await?;
        Ok(Auth { username, password })
    }
}

impl Shell for AuthShell {
    type Entity = Auth;
    const ENTITY: &'static str = "Auth";

    fn into_node(self) -> Node<Auth> {
        Node::nested(self)
    }
}

pub trait AuthBuilder<C> {
    fn username(&mut self, value: impl Into<String>);
    fn password(&mut self, value: impl Into<String>);
}

impl<C> AuthBuilder<C> for Builder<AuthShell, C> {
    fn username(&mut self, value: impl Into<String>) {
        let node = Node::literal(value.into());
        self.update(|mut s| {
            s.username = Some(node);
            s
        });
    }

    fn password(&mut self, value: impl Into<String>) {
        let node = Node::literal(value.into());
        self.update(|mut s| {
            s.password = Some(node);
            s
        });
    }
}
