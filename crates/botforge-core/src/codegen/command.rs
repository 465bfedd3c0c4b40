use crate::catalog::ComponentCatalog;
use crate::command::AtomicCommand;
use crate::project::Project;
use crate::types::{EndCondition, InvocationType};

/// Assembles one atomic command into a Java factory method. Returns `""`
/// when the command is not yet generatable: missing name, subsystem,
/// action, or end condition, or a call option pointing at nothing.
pub fn assemble(command: &AtomicCommand, project: &Project, catalog: &ComponentCatalog) -> String {
    if command.name.trim().is_empty() {
        return String::new();
    }
    let Some(subsystem) = project.subsystem(command.subsystem) else {
        return String::new();
    };
    let Some(action_id) = command.action else {
        return String::new();
    };
    let Some(action) = subsystem.action(action_id) else {
        return String::new();
    };
    let Some(end) = &command.end_condition else {
        return String::new();
    };

    let params = action.synthesize_params(&subsystem.components, catalog);

    let mut signature: Vec<String> = Vec::new();
    for option in command.public_options() {
        let Some(param) = params.iter().find(|p| p.uuid == option.param) else {
            return String::new();
        };
        match option.invocation {
            InvocationType::PassthroughValue => {
                signature.push(format!("{} {}", param.ty.java_name(), param.name));
            }
            InvocationType::PassthroughSupplier => {
                signature.push(format!("{} {}", param.ty.supplier_name(), param.name));
            }
            InvocationType::Hardcode => {}
        }
    }

    let args: Vec<String> = params
        .iter()
        .map(|param| match command.option_for(param.uuid) {
            None => "/* unset */".to_string(),
            Some(option) => match option.invocation {
                InvocationType::Hardcode => match option.hardcoded_value.as_deref() {
                    Some(v) if !v.trim().is_empty() => v.to_string(),
                    _ => "/* unset */".to_string(),
                },
                InvocationType::PassthroughValue => param.name.clone(),
                InvocationType::PassthroughSupplier => {
                    format!("{}.{}()", param.name, param.ty.supplier_getter())
                }
            },
        })
        .collect();
    let invocation = invocation_expr(&action.method_name(), &args);

    let mut expr = match end {
        EndCondition::Once => format!("runOnce({invocation})"),
        EndCondition::Forever => format!("run({invocation})"),
        EndCondition::State(id) => {
            let Some(state) = subsystem.state(*id) else {
                return String::new();
            };
            format!("run({invocation}).until(this::{})", state.method_name())
        }
    };

    if !command.to_initialize.is_empty() {
        let mut inits: Vec<String> = Vec::new();
        for id in &command.to_initialize {
            let Some(init) = subsystem.action(*id) else {
                return String::new();
            };
            inits.push(init.method_name());
        }
        // Initialization actions are always invoked without arguments.
        let init_expr = if inits.len() == 1 {
            format!("runOnce(this::{})", inits[0])
        } else {
            let calls = inits
                .iter()
                .map(|m| format!("this.{m}();"))
                .collect::<Vec<_>>()
                .join(" ");
            format!("runOnce(() -> {{ {calls} }})")
        };
        expr = format!("{init_expr}.andThen({expr})");
    }

    format!(
        "public Command {}({}) {{ return {expr}; }}",
        command.method_name(),
        signature.join(", ")
    )
}

fn invocation_expr(method: &str, args: &[String]) -> String {
    if args.is_empty() {
        format!("this::{method}")
    } else {
        format!("() -> this.{method}({})", args.join(", "))
    }
}
