//! Purpose: Hold top-level CLI command dispatch for `prestige`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Catalog edits go through `UiEvent` dispatch so they share the page's validators.
//! Invariants: Toasts raised by a command are flushed to stderr only after it succeeds.

use super::*;
use clap::CommandFactory;
use serde_json::Map;
use prestige::api::{
    CatalogStore, ErrorSlots, FormValues, MountPoints, UiEvent, format_total, validate_form,
};

pub(super) fn dispatch_command(
    command: Command,
    storage_dir: PathBuf,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "prestige", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output();
            Ok(RunOutcome::ok())
        }
        Command::Catalog { command } => dispatch_catalog(command, &storage_dir, color_mode),
        Command::Render { target, add } => {
            let mut storefront = open_storefront(&storage_dir)?;
            let mounts = storefront.config().mounts.clone();
            match target {
                RenderTarget::Products => {
                    if !add.is_empty() {
                        return Err(Error::new(ErrorKind::Usage)
                            .with_message("--add only applies to `render cart`"));
                    }
                    emit_json(json!({
                        "mount": mounts.product_grid,
                        "markup": storefront.page().mount(&mounts.product_grid).unwrap_or(""),
                    }));
                }
                RenderTarget::Cart => {
                    for id in add {
                        require_product(&storefront, id)?;
                        storefront.dispatch(UiEvent::AddToCart(id))?;
                    }
                    emit_json(cart_json(&storefront, &mounts));
                }
            }
            Ok(RunOutcome::ok())
        }
        Command::Validate { form, fields } => {
            let kind = FormKind::from(form);
            let mut values = FormValues::new();
            for raw in &fields {
                let (key, value) = raw.split_once('=').ok_or_else(|| {
                    Error::new(ErrorKind::Usage)
                        .with_message(format!("invalid --field '{raw}'"))
                        .with_hint("Use KEY=VALUE, e.g. --field email=ana@example.com.")
                })?;
                let field = resolve_field(kind, key).ok_or_else(|| {
                    let known = kind
                        .fields()
                        .iter()
                        .map(|field| field.input_id())
                        .collect::<Vec<_>>()
                        .join(", ");
                    Error::new(ErrorKind::Usage)
                        .with_message(format!("unknown field '{key}'"))
                        .with_hint(format!("Fields for this form: {known}."))
                })?;
                values.set(field, value);
            }

            let mut slots = ErrorSlots::new();
            let valid = validate_form(kind, &values, &mut slots);
            emit_json(json!({
                "form": kind.form_id(),
                "valid": valid,
                "errors": slot_errors_json(&slots, kind),
            }));
            if valid {
                Ok(RunOutcome::ok())
            } else {
                Ok(RunOutcome::with_code(to_exit_code(ErrorKind::Usage)))
            }
        }
    }
}

fn dispatch_catalog(
    command: CatalogCommand,
    storage_dir: &std::path::Path,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command {
        CatalogCommand::List => {
            let storefront = open_storefront(storage_dir)?;
            emit_json(products_json(storefront.catalog().products()));
        }
        CatalogCommand::Add {
            name,
            price,
            image,
            description,
        } => {
            let mut storefront = open_storefront(storage_dir)?;
            let before = storefront.catalog().next_id()?;
            fill(&mut storefront, Field::ProductName, Some(name))?;
            fill(&mut storefront, Field::ProductPrice, Some(price))?;
            fill(&mut storefront, Field::ProductImage, Some(image))?;
            fill(&mut storefront, Field::ProductDescription, Some(description))?;
            storefront.dispatch(UiEvent::Submit(FormKind::Product))?;
            ensure_form_valid(storefront.errors(), FormKind::Product)?;

            let created = storefront.catalog().get(before).ok_or_else(|| {
                Error::new(ErrorKind::Internal).with_message("created product was not stored")
            })?;
            emit_json(json!({ "product": product_json(created) }));
            emit_toasts(&storefront, "catalog add", color_mode);
        }
        CatalogCommand::Update {
            id,
            name,
            price,
            image,
            description,
        } => {
            let mut storefront = open_storefront(storage_dir)?;
            require_product(&storefront, id)?;
            storefront.dispatch(UiEvent::EditProduct(id))?;
            fill(&mut storefront, Field::ProductName, name)?;
            fill(&mut storefront, Field::ProductPrice, price)?;
            fill(&mut storefront, Field::ProductImage, image)?;
            fill(&mut storefront, Field::ProductDescription, description)?;
            storefront.dispatch(UiEvent::Submit(FormKind::Product))?;
            ensure_form_valid(storefront.errors(), FormKind::Product)?;

            let updated = require_product(&storefront, id)?;
            emit_json(json!({ "product": product_json(updated) }));
            emit_toasts(&storefront, "catalog update", color_mode);
        }
        CatalogCommand::Delete { id, yes } => {
            let mut storefront = open_storefront(storage_dir)?;
            let removed = require_product(&storefront, id)?.clone();
            storefront.dispatch(UiEvent::DeleteProduct(id))?;
            if !yes {
                let prompt = storefront
                    .confirmation()
                    .map(|pending| pending.message.clone())
                    .unwrap_or_default();
                storefront.dispatch(UiEvent::ConfirmCancelled)?;
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(prompt)
                    .with_hint("Re-run with --yes to confirm the deletion."));
            }
            storefront.dispatch(UiEvent::ConfirmAccepted)?;
            emit_json(json!({ "deleted": product_json(&removed) }));
            emit_toasts(&storefront, "catalog delete", color_mode);
        }
        CatalogCommand::Reset => {
            let mut catalog = CatalogStore::new(FileStorage::new(storage_dir));
            catalog.reset()?;
            emit_json(products_json(catalog.products()));
        }
    }
    Ok(RunOutcome::ok())
}

fn emit_version_output() {
    if io::stdout().is_terminal() {
        println!("prestige {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(json!({
            "name": "prestige",
            "version": env!("CARGO_PKG_VERSION"),
        }));
    }
}

fn fill(
    storefront: &mut Storefront<FileStorage>,
    field: Field,
    value: Option<String>,
) -> Result<(), Error> {
    match value {
        Some(value) => storefront.dispatch(UiEvent::Input { field, value }),
        None => Ok(()),
    }
}

fn require_product(storefront: &Storefront<FileStorage>, id: u64) -> Result<&Product, Error> {
    storefront.catalog().get(id).ok_or_else(|| {
        Error::new(ErrorKind::NotFound)
            .with_message(format!("no product with id {id}"))
            .with_hint("Use `prestige catalog list` to see product ids.")
    })
}

fn ensure_form_valid(slots: &ErrorSlots, kind: FormKind) -> Result<(), Error> {
    let errors = slots.errors(kind);
    if errors.is_empty() {
        return Ok(());
    }
    let details = errors
        .iter()
        .map(|(field, message)| format!("{}: {message}", field.input_id()))
        .collect::<Vec<_>>()
        .join("; ");
    Err(Error::new(ErrorKind::Usage)
        .with_message(format!("{} has invalid fields", kind.form_id()))
        .with_hint(details))
}

fn slot_errors_json(slots: &ErrorSlots, kind: FormKind) -> Value {
    let errors = slots
        .errors(kind)
        .into_iter()
        .map(|(field, message)| {
            json!({
                "field": field.input_id(),
                "slot": field.error_slot(),
                "message": message,
            })
        })
        .collect::<Vec<_>>();
    Value::Array(errors)
}

fn products_json(products: &[Product]) -> Value {
    json!({
        "count": products.len(),
        "products": products.iter().map(product_json).collect::<Vec<_>>(),
    })
}

fn cart_json(storefront: &Storefront<FileStorage>, mounts: &MountPoints) -> Value {
    let page = storefront.page();
    let mut markup = Map::new();
    for id in [
        &mounts.cart_items,
        &mounts.cart_total,
        &mounts.checkout_total,
        &mounts.cart_count,
    ] {
        markup.insert(id.clone(), json!(page.mount(id).unwrap_or("")));
    }
    json!({
        "items": storefront.cart().len(),
        "total": format_total(storefront.cart().total()),
        "mounts": Value::Object(markup),
    })
}
