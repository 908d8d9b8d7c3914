#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use identity_register::{CommandExecutor, Environment, ExecOutput};

/// Verbs that change state in the fake service.
pub const MUTATING_VERBS: &[&str] = &[
    "tenant-create",
    "service-create",
    "service-delete",
    "endpoint-create",
    "endpoint-delete",
    "role-create",
    "user-create",
    "user-password-update",
    "user-role-add",
    "ec2-credentials-create",
];

#[derive(Debug, Clone)]
struct Tenant {
    id: String,
    name: String,
    enabled: bool,
}

#[derive(Debug, Clone)]
struct Service {
    id: String,
    service_type: String,
    name: String,
    description: String,
}

#[derive(Debug, Clone)]
struct Endpoint {
    id: String,
    region: String,
    service_id: String,
    publicurl: String,
    internalurl: String,
    adminurl: String,
}

#[derive(Debug, Clone)]
struct Role {
    id: String,
    name: String,
}

#[derive(Debug, Clone)]
struct User {
    id: String,
    name: String,
    tenant_id: String,
    password: String,
    enabled: bool,
}

#[derive(Debug, Clone)]
struct Grant {
    user_id: String,
    tenant_id: String,
    role_id: String,
}

#[derive(Debug, Clone)]
struct Ec2Credential {
    user_id: String,
    tenant_id: String,
    access: String,
    secret: String,
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    tenants: Vec<Tenant>,
    services: Vec<Service>,
    endpoints: Vec<Endpoint>,
    roles: Vec<Role>,
    users: Vec<User>,
    grants: Vec<Grant>,
    ec2: Vec<Ec2Credential>,
    verbs: Vec<String>,
}

impl State {
    fn id(&mut self) -> String {
        self.next_id += 1;
        format!("{:032x}", self.next_id)
    }

    fn tenant_name(&self, id: &str) -> String {
        self.tenants
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.name.clone())
            .unwrap_or_default()
    }
}

/// The parts of one command line the fake cares about.
#[derive(Debug, Default)]
struct Invocation {
    os: BTreeMap<String, String>,
    verb: String,
    options: BTreeMap<String, String>,
    positional: Vec<String>,
}

fn split(args: &[String]) -> Invocation {
    let mut invocation = Invocation::default();
    let mut iter = args.iter().skip(1).peekable();
    while let Some(arg) = iter.next() {
        if arg == "--insecure" {
            continue;
        }
        if let Some(url) = arg.strip_prefix("--os-auth-url=") {
            invocation.os.insert("auth-url".to_string(), url.to_string());
        } else if let Some(key) = arg.strip_prefix("--os-") {
            let value = iter.next().cloned().unwrap_or_default();
            invocation.os.insert(key.to_string(), value);
        } else {
            invocation.verb = arg.clone();
            break;
        }
    }
    while let Some(arg) = iter.next() {
        match arg.strip_prefix("--") {
            Some(key) => {
                let value = match iter.peek() {
                    Some(next) if !next.starts_with("--") => iter.next().cloned().unwrap_or_default(),
                    _ => "true".to_string(),
                };
                invocation.options.insert(key.to_string(), value);
            }
            None => invocation.positional.push(arg.clone()),
        }
    }
    invocation
}

/// Renders rows the way the tool prints them.
pub fn render(columns: &[&str], rows: &[Vec<String>]) -> String {
    let border = "+------+\n";
    let mut out = String::from(border);
    out.push_str(&format!("| {} |\n", columns.join(" | ")));
    out.push_str(border);
    for row in rows {
        out.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    out.push_str(border);
    out
}

fn properties(pairs: &[(&str, String)]) -> String {
    let rows: Vec<Vec<String>> = pairs
        .iter()
        .map(|(key, value)| vec![key.to_string(), value.clone()])
        .collect();
    render(&["Property", "Value"], &rows)
}

fn flag(value: Option<&String>) -> bool {
    value.is_none_or(|v| !v.eq_ignore_ascii_case("false"))
}

fn cased(flag: bool) -> String {
    if flag { "True" } else { "False" }.to_string()
}

/// An in-memory identity service driven through keystone-style command lines.
#[derive(Default)]
pub struct FakeKeystone {
    state: Mutex<State>,
}

impl FakeKeystone {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every verb run so far, in order.
    pub fn verbs(&self) -> Vec<String> {
        self.state.lock().unwrap().verbs.clone()
    }

    /// Verbs run so far that changed state.
    pub fn mutations(&self) -> Vec<String> {
        self.verbs()
            .into_iter()
            .filter(|verb| MUTATING_VERBS.contains(&verb.as_str()))
            .collect()
    }

    pub fn clear_log(&self) {
        self.state.lock().unwrap().verbs.clear();
    }

    /// Changes a user's password behind the reconciler's back.
    pub fn set_password(&self, user: &str, password: &str) {
        let mut state = self.state.lock().unwrap();
        for u in state.users.iter_mut().filter(|u| u.name == user) {
            u.password = password.to_string();
        }
    }

    /// Changes a service's name behind the reconciler's back.
    pub fn rename_service(&self, service_type: &str, name: &str) {
        let mut state = self.state.lock().unwrap();
        for s in state.services.iter_mut().filter(|s| s.service_type == service_type) {
            s.name = name.to_string();
        }
    }

    pub fn password_of(&self, user: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .users
            .iter()
            .find(|u| u.name == user)
            .map(|u| u.password.clone())
    }

    pub fn count(&self, kind: &str) -> usize {
        let state = self.state.lock().unwrap();
        match kind {
            "tenant" => state.tenants.len(),
            "service" => state.services.len(),
            "endpoint" => state.endpoints.len(),
            "role" => state.roles.len(),
            "user" => state.users.len(),
            "role_grant" => state.grants.len(),
            "ec2_credential" => state.ec2.len(),
            _ => 0,
        }
    }

    fn run(&self, invocation: &Invocation) -> ExecOutput {
        let mut state = self.state.lock().unwrap();
        state.verbs.push(invocation.verb.clone());
        let opt = |key: &str| invocation.options.get(key).cloned().unwrap_or_default();

        match invocation.verb.as_str() {
            "tenant-list" => {
                let rows: Vec<_> = state
                    .tenants
                    .iter()
                    .map(|t| vec![t.id.clone(), t.name.clone(), cased(t.enabled)])
                    .collect();
                ExecOutput::success(render(&["id", "name", "enabled"], &rows))
            }
            "tenant-create" => {
                let tenant = Tenant {
                    id: state.id(),
                    name: opt("name"),
                    enabled: flag(invocation.options.get("enabled")),
                };
                let out = properties(&[
                    ("description", opt("description")),
                    ("enabled", cased(tenant.enabled)),
                    ("id", tenant.id.clone()),
                    ("name", tenant.name.clone()),
                ]);
                state.tenants.push(tenant);
                ExecOutput::success(out)
            }
            "service-list" => {
                let rows: Vec<_> = state
                    .services
                    .iter()
                    .map(|s| {
                        vec![
                            s.id.clone(),
                            s.name.clone(),
                            s.service_type.clone(),
                            s.description.clone(),
                        ]
                    })
                    .collect();
                ExecOutput::success(render(&["id", "name", "type", "description"], &rows))
            }
            "service-create" => {
                let service = Service {
                    id: state.id(),
                    service_type: opt("type"),
                    name: opt("name"),
                    description: opt("description"),
                };
                let out = properties(&[("id", service.id.clone()), ("name", service.name.clone())]);
                state.services.push(service);
                ExecOutput::success(out)
            }
            "service-delete" => {
                let id = invocation.positional.first().cloned().unwrap_or_default();
                state.services.retain(|s| s.id != id);
                ExecOutput::success("")
            }
            "endpoint-list" => {
                let rows: Vec<_> = state
                    .endpoints
                    .iter()
                    .map(|e| {
                        vec![
                            e.id.clone(),
                            e.region.clone(),
                            e.publicurl.clone(),
                            e.internalurl.clone(),
                            e.adminurl.clone(),
                            e.service_id.clone(),
                        ]
                    })
                    .collect();
                ExecOutput::success(render(
                    &["id", "region", "publicurl", "internalurl", "adminurl", "service_id"],
                    &rows,
                ))
            }
            "endpoint-create" => {
                let endpoint = Endpoint {
                    id: state.id(),
                    region: opt("region"),
                    service_id: opt("service_id"),
                    publicurl: opt("publicurl"),
                    internalurl: opt("internalurl"),
                    adminurl: opt("adminurl"),
                };
                let out = properties(&[("id", endpoint.id.clone())]);
                state.endpoints.push(endpoint);
                ExecOutput::success(out)
            }
            "endpoint-delete" => {
                let id = invocation.positional.first().cloned().unwrap_or_default();
                state.endpoints.retain(|e| e.id != id);
                ExecOutput::success("")
            }
            "role-list" => {
                let rows: Vec<_> = state
                    .roles
                    .iter()
                    .map(|r| vec![r.id.clone(), r.name.clone()])
                    .collect();
                ExecOutput::success(render(&["id", "name"], &rows))
            }
            "role-create" => {
                let role = Role {
                    id: state.id(),
                    name: opt("name"),
                };
                let out = properties(&[("id", role.id.clone()), ("name", role.name.clone())]);
                state.roles.push(role);
                ExecOutput::success(out)
            }
            "user-list" => {
                let tenant = invocation.options.get("tenant-id");
                let rows: Vec<_> = state
                    .users
                    .iter()
                    .filter(|u| tenant.is_none_or(|t| *t == u.tenant_id))
                    .map(|u| vec![u.id.clone(), u.name.clone(), cased(u.enabled), String::new()])
                    .collect();
                ExecOutput::success(render(&["id", "name", "enabled", "email"], &rows))
            }
            "user-create" => {
                let user = User {
                    id: state.id(),
                    name: opt("name"),
                    tenant_id: opt("tenant-id"),
                    password: opt("pass"),
                    enabled: flag(invocation.options.get("enabled")),
                };
                let out = properties(&[("id", user.id.clone()), ("name", user.name.clone())]);
                state.users.push(user);
                ExecOutput::success(out)
            }
            "user-password-update" => {
                let target = invocation.positional.first().cloned().unwrap_or_default();
                let password = opt("pass");
                let mut found = false;
                for user in state
                    .users
                    .iter_mut()
                    .filter(|u| u.name == target || u.id == target)
                {
                    user.password = password.clone();
                    found = true;
                }
                if found {
                    ExecOutput::success("")
                } else {
                    ExecOutput::failure(1, format!("No user with a name or ID of '{}' exists.", target))
                }
            }
            "token-get" => {
                let username = invocation.os.get("username").cloned().unwrap_or_default();
                let password = invocation.os.get("password").cloned().unwrap_or_default();
                let tenant = invocation.os.get("tenant-name").cloned().unwrap_or_default();
                let valid = state.users.iter().any(|u| {
                    u.name == username && u.password == password && state.tenant_name(&u.tenant_id) == tenant
                });
                if valid {
                    ExecOutput::success(properties(&[("id", "token".to_string())]))
                } else {
                    ExecOutput::failure(1, "Invalid user / password (HTTP 401)")
                }
            }
            "user-role-list" => {
                let tenant_id = opt("tenant-id");
                let user_id = opt("user-id");
                let rows: Vec<_> = state
                    .grants
                    .iter()
                    .filter(|g| g.tenant_id == tenant_id && g.user_id == user_id)
                    .filter_map(|g| {
                        let role = state.roles.iter().find(|r| r.id == g.role_id)?;
                        Some(vec![
                            role.id.clone(),
                            role.name.clone(),
                            g.user_id.clone(),
                            g.tenant_id.clone(),
                        ])
                    })
                    .collect();
                ExecOutput::success(render(&["id", "name", "user_id", "tenant_id"], &rows))
            }
            "user-role-add" => {
                state.grants.push(Grant {
                    user_id: opt("user-id"),
                    tenant_id: opt("tenant-id"),
                    role_id: opt("role-id"),
                });
                ExecOutput::success("")
            }
            "ec2-credentials-list" => {
                let user_id = opt("user-id");
                let rows: Vec<_> = state
                    .ec2
                    .iter()
                    .filter(|c| c.user_id == user_id)
                    .map(|c| vec![state.tenant_name(&c.tenant_id), c.access.clone(), c.secret.clone()])
                    .collect();
                ExecOutput::success(render(&["tenant", "access", "secret"], &rows))
            }
            "ec2-credentials-create" => {
                if invocation.os.get("username").is_none() {
                    return ExecOutput::failure(1, "Expecting authentication method via --os-username");
                }
                let credential = Ec2Credential {
                    user_id: opt("user-id"),
                    tenant_id: opt("tenant-id"),
                    access: format!("access-{}", state.id()),
                    secret: format!("secret-{}", state.id()),
                };
                let out = properties(&[
                    ("access", credential.access.clone()),
                    ("secret", credential.secret.clone()),
                    ("tenant_id", credential.tenant_id.clone()),
                    ("user_id", credential.user_id.clone()),
                ]);
                state.ec2.push(credential);
                ExecOutput::success(out)
            }
            other => ExecOutput::failure(2, format!("keystone: error: invalid choice: '{}'", other)),
        }
    }
}

impl CommandExecutor for FakeKeystone {
    fn execute(&self, args: &[String], _env: &Environment) -> Result<ExecOutput, std::io::Error> {
        Ok(self.run(&split(args)))
    }
}
