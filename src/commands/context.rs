use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::{
  context::{Context, ContextStore, FileContextStore, CONTEXT_FILE},
  error::Error,
  state_dir,
};

fn context_store() -> Result<FileContextStore> {
  Ok(FileContextStore::new(state_dir()?.join(CONTEXT_FILE)))
}

/// The active context, or `ContextNotSet`
pub fn current_context() -> Result<Context> {
  Ok(context_store()?.get()?.ok_or(Error::ContextNotSet)?)
}

/// Input arguments for the `set-context` command
#[derive(Args, Debug)]
pub struct SetContext {
  /// Context to switch to
  pub context: Option<String>,
}

impl SetContext {
  pub fn run(&self) -> Result<()> {
    let name = self.context.as_deref().ok_or(Error::InvalidContext { given: None })?;
    let context: Context = name.parse()?;

    context_store()?.put(context)?;
    info!("context set to {context}");

    Ok(())
  }
}

/// Input arguments for the `get-context` command
#[derive(Args, Debug)]
pub struct GetContext {}

impl GetContext {
  pub fn run(&self) -> Result<()> {
    let context = current_context()?;
    println!("{context}");

    Ok(())
  }
}

/// Input arguments for the `list-contexts` command
#[derive(Args, Debug)]
pub struct ListContexts {}

impl ListContexts {
  pub fn run(&self) -> Result<()> {
    // listing still works when the persisted value is absent or bogus
    let current = context_store()?.get().unwrap_or(None);
    for context in Context::ALL {
      match current == Some(context) {
        true => println!("* {context}"),
        false => println!("  {context}"),
      }
    }

    Ok(())
  }
}
