use crate::catalog::ComponentCatalog;
use crate::group::{
    CommandGroup, CommandInvocation, ConditionRef, Decorator, GroupChild, GroupKind,
    InvocationArg, ParamOrigin, ParamPlaceholder,
};
use crate::ident;
use crate::project::Project;
use crate::types::{InvocationType, ParallelEnd};
use std::collections::HashSet;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Emits one named group as a multi-line Java factory method. Anonymous or
/// unnamed groups are not generatable on their own and return `""`; they
/// only render inline inside a parent's expression.
pub fn emit_group(group: &CommandGroup, project: &Project, catalog: &ComponentCatalog) -> String {
    let method = match group.name.as_deref() {
        Some(name) if !name.trim().is_empty() => ident::lower_camel(name),
        _ => return String::new(),
    };
    let params = group
        .params
        .iter()
        .map(|p| format!("{} {}", placeholder_type(p, group, project, catalog), p.name))
        .collect::<Vec<_>>()
        .join(", ");
    let mut emitter = GroupEmitter {
        project,
        scope: Vec::new(),
    };
    let expr = emitter.group_expr(group, true);
    format!("public Command {method}({params}) {{\n    return {expr};\n}}")
}

// ---------------------------------------------------------------------------
// Expression emission
// ---------------------------------------------------------------------------

struct GroupEmitter<'a> {
    project: &'a Project,
    /// Placeholder names visible at the current depth, innermost last.
    scope: Vec<String>,
}

impl GroupEmitter<'_> {
    /// The composite expression for a group. At the top level a sequential
    /// chain puts each continuation on its own 8-space-indented line;
    /// inlined nested groups render compactly.
    fn group_expr(&mut self, group: &CommandGroup, top: bool) -> String {
        let added = group.params.len();
        self.scope.extend(group.params.iter().map(|p| p.name.clone()));

        let exprs: Vec<String> = group
            .children
            .iter()
            .map(|child| self.child_expr(child))
            .collect();

        let mut expr = if exprs.is_empty() {
            "/* empty group */".to_string()
        } else if exprs.len() == 1 {
            exprs[0].clone()
        } else {
            match group.kind {
                GroupKind::Sequential => {
                    let mut out = exprs[0].clone();
                    for rest in &exprs[1..] {
                        if top {
                            out.push_str("\n        ");
                        }
                        out.push_str(&format!(".andThen({rest})"));
                    }
                    out
                }
                GroupKind::Parallel { end } => parallel_expr(&exprs, group, end),
            }
        };

        expr.push_str(&self.decorator_suffix(&group.decorators));
        self.scope.truncate(self.scope.len() - added);
        expr
    }

    fn child_expr(&mut self, child: &GroupChild) -> String {
        match child {
            GroupChild::Invocation(inv) => {
                let mut expr = self.invocation_expr(inv);
                expr.push_str(&self.decorator_suffix(&inv.decorators));
                expr
            }
            GroupChild::Group(group) => self.group_expr(group, false),
        }
    }

    /// A leaf call. Subsystem commands go through the subsystem field;
    /// named top-level groups are referenced by their generated method,
    /// never re-expanded.
    fn invocation_expr(&mut self, inv: &CommandInvocation) -> String {
        let args = inv
            .args
            .iter()
            .map(|arg| self.arg_expr(arg))
            .collect::<Vec<_>>()
            .join(", ");
        if let Some(cmd) = self.project.find_atomic(inv.command) {
            if let Some(subsystem) = self.project.subsystem(cmd.subsystem) {
                return format!(
                    "this.{}.{}({args})",
                    subsystem.field_name(),
                    cmd.method_name()
                );
            }
        }
        if let Some(group) = self.project.find_group(inv.command) {
            if let Some(name) = group.name.as_deref() {
                if !name.trim().is_empty() {
                    return format!("this.{}({args})", ident::lower_camel(name));
                }
            }
        }
        format!("/* unknown command {} */", inv.command)
    }

    fn arg_expr(&mut self, arg: &InvocationArg) -> String {
        match arg {
            InvocationArg::Literal { value } => {
                if value.trim().is_empty() {
                    "/* unset */".to_string()
                } else {
                    value.clone()
                }
            }
            InvocationArg::Placeholder { name } => self.placeholder_expr(name),
        }
    }

    fn placeholder_expr(&self, name: &str) -> String {
        if self.scope.iter().any(|n| n == name) {
            name.to_string()
        } else {
            format!("/* unbound param {name} */")
        }
    }

    fn decorator_suffix(&mut self, decorators: &[Decorator]) -> String {
        let mut out = String::new();
        for decorator in decorators {
            match decorator {
                Decorator::Duration { seconds } => {
                    out.push_str(&format!(".withTimeout({})", fmt_seconds(*seconds)));
                }
                Decorator::Until { cond } => {
                    out.push_str(&format!(".until({})", self.condition_expr(cond)));
                }
                Decorator::Unless { cond } => {
                    out.push_str(&format!(".unless({})", self.condition_expr(cond)));
                }
                Decorator::Repeat => out.push_str(".repeatedly()"),
            }
        }
        out
    }

    fn condition_expr(&mut self, cond: &ConditionRef) -> String {
        match cond {
            ConditionRef::State { subsystem, state } => {
                let resolved = self
                    .project
                    .subsystem(*subsystem)
                    .and_then(|sub| sub.state(*state).map(|st| (sub, st)));
                match resolved {
                    Some((sub, st)) => format!("this.{}::{}", sub.field_name(), st.method_name()),
                    None => format!("/* unknown state {state} */"),
                }
            }
            ConditionRef::Placeholder { name } => self.placeholder_expr(name),
        }
    }
}

fn parallel_expr(exprs: &[String], group: &CommandGroup, end: ParallelEnd) -> String {
    let (seed, marker) = match end {
        ParallelEnd::All | ParallelEnd::Any => (0, ""),
        ParallelEnd::Child(id) => match group.children.iter().position(|c| c.uuid() == id) {
            Some(index) => (index, ""),
            None => (0, " /* missing deadline child */"),
        },
    };
    let combinator = match end {
        ParallelEnd::All => "alongWith",
        ParallelEnd::Any => "raceWith",
        ParallelEnd::Child(_) => "deadlineWith",
    };
    let rest = exprs
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != seed)
        .map(|(_, e)| e.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}.{combinator}({rest}){marker}", exprs[seed])
}

/// Timeout seconds keep a trailing `.0` for whole values so the emitted
/// literal is unambiguously a double.
fn fmt_seconds(seconds: f64) -> String {
    if seconds.fract() == 0.0 {
        format!("{seconds:.1}")
    } else {
        format!("{seconds}")
    }
}

// ---------------------------------------------------------------------------
// Placeholder parameter types
// ---------------------------------------------------------------------------

/// The Java type of a group placeholder: the originating call option's type
/// when the placeholder was lifted from one, otherwise inferred from its
/// first typeable use site, otherwise `double`.
fn placeholder_type(
    placeholder: &ParamPlaceholder,
    group: &CommandGroup,
    project: &Project,
    catalog: &ComponentCatalog,
) -> String {
    if let Some(origin) = &placeholder.original {
        if let Some(ty) = origin_type(origin, project, catalog) {
            return ty;
        }
    }
    let mut visited = HashSet::new();
    first_use_type(&placeholder.name, group, project, catalog, &mut visited)
        .unwrap_or_else(|| "double".to_string())
}

fn origin_type(origin: &ParamOrigin, project: &Project, catalog: &ComponentCatalog) -> Option<String> {
    let cmd = project.find_atomic(origin.command)?;
    let option = cmd.option_for(origin.param)?;
    let subsystem = project.subsystem(cmd.subsystem)?;
    let action = subsystem.action(cmd.action?)?;
    let params = action.synthesize_params(&subsystem.components, catalog);
    let param = params.iter().find(|p| p.uuid == origin.param)?;
    Some(match option.invocation {
        InvocationType::PassthroughSupplier => param.ty.supplier_name(),
        _ => param.ty.java_name().to_string(),
    })
}

fn first_use_type(
    name: &str,
    group: &CommandGroup,
    project: &Project,
    catalog: &ComponentCatalog,
    visited: &mut HashSet<Uuid>,
) -> Option<String> {
    if !visited.insert(group.uuid) {
        return None;
    }
    for child in &group.children {
        match child {
            GroupChild::Invocation(inv) => {
                for (index, arg) in inv.args.iter().enumerate() {
                    let InvocationArg::Placeholder { name: used } = arg else {
                        continue;
                    };
                    if used != name {
                        continue;
                    }
                    if let Some(ty) = use_site_type(inv.command, index, project, catalog, visited) {
                        return Some(ty);
                    }
                }
                if decorators_use(&inv.decorators, name) {
                    return Some("BooleanSupplier".to_string());
                }
            }
            GroupChild::Group(nested) => {
                // A nested declaration of the same name shadows ours.
                if nested.placeholder(name).is_some() {
                    continue;
                }
                if let Some(ty) = first_use_type(name, nested, project, catalog, visited) {
                    return Some(ty);
                }
            }
        }
    }
    if decorators_use(&group.decorators, name) {
        return Some("BooleanSupplier".to_string());
    }
    None
}

/// The type a placeholder takes when passed as the `index`-th argument of
/// an invocation of `command`: positionally matched against an atomic
/// command's public call options, or a named group's own placeholders.
fn use_site_type(
    command: Uuid,
    index: usize,
    project: &Project,
    catalog: &ComponentCatalog,
    visited: &mut HashSet<Uuid>,
) -> Option<String> {
    if let Some(cmd) = project.find_atomic(command) {
        let subsystem = project.subsystem(cmd.subsystem)?;
        let action = subsystem.action(cmd.action?)?;
        let params = action.synthesize_params(&subsystem.components, catalog);
        let option = cmd.public_options().nth(index)?;
        let param = params.iter().find(|p| p.uuid == option.param)?;
        return Some(match option.invocation {
            InvocationType::PassthroughSupplier => param.ty.supplier_name(),
            _ => param.ty.java_name().to_string(),
        });
    }
    if let Some(target) = project.find_group(command) {
        let forwarded = target.params.get(index)?;
        if let Some(origin) = &forwarded.original {
            if let Some(ty) = origin_type(origin, project, catalog) {
                return Some(ty);
            }
        }
        return first_use_type(&forwarded.name, target, project, catalog, visited);
    }
    None
}

fn decorators_use(decorators: &[Decorator], name: &str) -> bool {
    decorators.iter().any(|d| match d {
        Decorator::Until { cond } | Decorator::Unless { cond } => {
            matches!(cond, ConditionRef::Placeholder { name: n } if n == name)
        }
        _ => false,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
