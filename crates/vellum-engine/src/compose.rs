//! Template save preparation and proposal composition.

use vellum_types::{PlaceholderDefinition, Proposal, ProposalId, Template, TemplateSection, Values};

use crate::detect::{detect_all, merge_definitions};
use crate::transform::Transformer;
use crate::Result;

/// Placeholder names, compared uppercased, that carry the client's name.
pub const CLIENT_NAME_KEYS: [&str; 2] = ["CLIENT_NAME", "CLIENT_COMPANY_NAME"];

fn is_client_key(name: &str) -> bool {
    CLIENT_NAME_KEYS.contains(&name.to_uppercase().as_str())
}

/// Set `client` as the initial value of `CLIENT_NAME` and of every
/// placeholder whose uppercased name is a client key.
pub fn seed_client_name(values: &mut Values, placeholders: &[PlaceholderDefinition], client: &str) {
    values.insert(CLIENT_NAME_KEYS[0].to_string(), client.to_string());
    for def in placeholders.iter().filter(|d| is_client_key(&d.name)) {
        values.insert(def.name.clone(), client.to_string());
    }
}

/// First non-blank initial value stored under a client key.
pub fn client_name(values: &Values) -> Option<&str> {
    values
        .iter()
        .find(|(name, value)| is_client_key(name) && !value.trim().is_empty())
        .map(|(_, value)| value.as_str())
}

/// Validate a template and register the placeholders its text contains.
///
/// Definitions are re-detected from every Delta section (in `order`) and
/// merged with the stored ones, so author-edited descriptions, defaults and
/// ids survive while definitions for deleted tokens go away.
pub fn prepare_template(template: &Template) -> Result<Template> {
    template.validate()?;
    let bodies: Vec<_> = template.bodies().collect();
    let detected = detect_all(bodies.iter().map(|body| &**body));
    let mut prepared = template.clone();
    prepared.placeholders = merge_definitions(detected, &template.placeholders);
    tracing::info!(
        template = ?template.id,
        name = %template.name,
        placeholders = prepared.placeholders.len(),
        "prepared template"
    );
    Ok(prepared)
}

/// `"Proposal for <client> based on <template>"`.
pub fn proposal_title(client_name: Option<&str>, template_name: &str) -> String {
    let client = client_name.filter(|c| !c.trim().is_empty()).unwrap_or("[Client]");
    format!("Proposal for {client} based on {template_name}")
}

/// Build a proposal draft from a template.
///
/// Sections come out sorted by `order`, each as a Delta section. HTML is
/// wrapped as a single text insert before transforming. One id allocator
/// is shared across sections, so embed ids are unique in the proposal.
pub fn compose_proposal(
    template: &Template,
    initial_values: &Values,
    transformer: &Transformer,
) -> Proposal {
    let mut ids = transformer.allocator();
    let sections = template
        .sections_ordered()
        .into_iter()
        .map(|section| {
            let body = section.body_delta();
            TemplateSection::delta(
                section.order,
                transformer.transform_with(&body, &template.placeholders, initial_values, &mut ids),
            )
        })
        .collect();

    let client_name = client_name(initial_values).map(str::to_string);
    let proposal = Proposal {
        id: ProposalId::new(),
        template_id: template.id,
        title: proposal_title(client_name.as_deref(), &template.name),
        client_name,
        sections,
    };
    tracing::info!(proposal = %proposal.id, template = ?template.id, "composed proposal");
    proposal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::ids::IdStrategy;
    use vellum_types::{Delta, EmbedValue, Op, PlaceholderDefinition, TemplateError};

    fn template() -> Template {
        let mut template = Template::new(
            "Web Redesign",
            Delta::from_ops(vec![Op::text("Dear {{CLIENT_NAME}},\nWe propose {{SCOPE}}.\n")]),
        );
        template.sections.push(TemplateSection::html(1, "<p>Terms for {{CLIENT_NAME}}</p>"));
        template.sections.push(TemplateSection::delta(
            2,
            Delta::from_ops(vec![Op::text("Signed for {{CLIENT_NAME}}\n")]),
        ));
        template
    }

    #[test]
    fn test_prepare_detects_across_sections() {
        let prepared = prepare_template(&template()).unwrap();
        let names: Vec<&str> = prepared.placeholders.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["CLIENT_NAME", "SCOPE"]);
    }

    #[test]
    fn test_prepare_keeps_author_definitions() {
        let mut tpl = template();
        tpl.placeholders = vec![PlaceholderDefinition::new("SCOPE").with_default("a new website")];
        let prepared = prepare_template(&tpl).unwrap();
        assert_eq!(prepared.placeholders[1].default_value.as_deref(), Some("a new website"));
    }

    #[test]
    fn test_prepare_rejects_invalid() {
        let mut tpl = template();
        tpl.name = String::new();
        assert_eq!(
            prepare_template(&tpl).unwrap_err(),
            EngineError::Template(TemplateError::MissingName)
        );
    }

    #[test]
    fn test_title() {
        assert_eq!(proposal_title(Some("Acme"), "Web"), "Proposal for Acme based on Web");
        assert_eq!(proposal_title(None, "Web"), "Proposal for [Client] based on Web");
        assert_eq!(proposal_title(Some("  "), "Web"), "Proposal for [Client] based on Web");
    }

    #[test]
    fn test_compose_fills_and_keeps_ids_unique() {
        let tpl = prepare_template(&template()).unwrap();
        let mut values = Values::new();
        values.insert("CLIENT_NAME".into(), "Acme".into());
        let transformer = Transformer::new().with_id_strategy(IdStrategy::derived(tpl.id_scope()));
        let proposal = compose_proposal(&tpl, &values, &transformer);

        assert_eq!(proposal.title, "Proposal for Acme based on Web Redesign");
        assert_eq!(proposal.client_name.as_deref(), Some("Acme"));
        assert_eq!(proposal.sections.len(), 3);
        assert!(proposal.sections.iter().all(|s| s.as_delta().is_some()));

        let ids: Vec<String> = proposal
            .sections
            .iter()
            .filter_map(TemplateSection::as_delta)
            .flat_map(|d| d.embeds().filter_map(EmbedValue::id).map(str::to_string).collect::<Vec<_>>())
            .collect();
        assert_eq!(ids.len(), 4);
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn test_compose_transforms_html_sections() {
        let tpl = prepare_template(&template()).unwrap();
        let mut values = Values::new();
        values.insert("CLIENT_NAME".into(), "Acme".into());
        let proposal = compose_proposal(&tpl, &values, &Transformer::new());

        let terms = proposal.sections[1].as_delta().unwrap();
        assert_eq!(terms.len(), 3);
        assert_eq!(terms.ops[0].as_text(), Some("<p>Terms for "));
        let embed = terms.ops[1].as_embed().and_then(EmbedValue::as_placeholder).unwrap();
        assert_eq!(embed.initial_content, "Acme");
        assert_eq!(terms.ops[2].as_text(), Some("</p>"));
    }

    #[test]
    fn test_compose_empty_html_section() {
        let mut tpl = template();
        tpl.sections[1] = TemplateSection::html(1, "");
        let proposal = compose_proposal(&tpl, &Values::new(), &Transformer::new());
        assert!(proposal.sections[1].as_delta().unwrap().is_empty());
    }

    #[test]
    fn test_seed_client_name_covers_client_keys() {
        let placeholders = vec![
            PlaceholderDefinition::new("client_company_name"),
            PlaceholderDefinition::new("Client_Name"),
            PlaceholderDefinition::new("SCOPE"),
        ];
        let mut values = Values::new();
        values.insert("SCOPE".into(), "a website".into());
        seed_client_name(&mut values, &placeholders, "Initech");

        assert_eq!(values.get("CLIENT_NAME").map(String::as_str), Some("Initech"));
        assert_eq!(values.get("client_company_name").map(String::as_str), Some("Initech"));
        assert_eq!(values.get("Client_Name").map(String::as_str), Some("Initech"));
        assert_eq!(values.get("SCOPE").map(String::as_str), Some("a website"));
    }

    #[test]
    fn test_client_name_lookup() {
        let mut values = Values::new();
        assert_eq!(client_name(&values), None);
        values.insert("CLIENT_NAME".into(), " ".into());
        values.insert("Client_Company_Name".into(), "Globex".into());
        assert_eq!(client_name(&values), Some("Globex"));
    }

    #[test]
    fn test_title_uses_company_name_key() {
        let mut tpl = Template::new(
            "Audit",
            Delta::from_ops(vec![Op::text("Prepared for {{CLIENT_COMPANY_NAME}}\n")]),
        );
        tpl = prepare_template(&tpl).unwrap();
        let mut values = Values::new();
        seed_client_name(&mut values, &tpl.placeholders, "Umbrella");
        let proposal = compose_proposal(&tpl, &values, &Transformer::new());

        assert_eq!(proposal.title, "Proposal for Umbrella based on Audit");
        let body = proposal.sections[0].as_delta().unwrap();
        let embed = body.ops[1].as_embed().and_then(EmbedValue::as_placeholder).unwrap();
        assert_eq!(embed.initial_content, "Umbrella");
    }

    #[test]
    fn test_derived_compose_is_repeatable() {
        let tpl = prepare_template(&template()).unwrap();
        let transformer = Transformer::new().with_id_strategy(IdStrategy::derived(tpl.id_scope()));
        let a = compose_proposal(&tpl, &Values::new(), &transformer);
        let b = compose_proposal(&tpl, &Values::new(), &transformer);
        assert_eq!(a.sections, b.sections);
        assert_ne!(a.id, b.id);
    }
}
