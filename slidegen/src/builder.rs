//! Assembles slide render configs from definitions and a presentation
//! context.

use log::debug;

use crate::{
    Definitions, Error, PresentationContext, RoleData, SlideRenderConfig, TemplateDefinition,
    TextField,
};

/// Orchestrates one slide build: template lookup, data transforms, text
/// rendering and style resolution.
///
/// The builder only reads from the definitions and the context, so any
/// number of builds may run at once over shared definitions as long as
/// each uses its own context.
#[derive(Debug, Clone, Copy)]
pub struct SlideConfigBuilder<'d> {
    definitions: &'d Definitions,
}

/// Outcome of [`SlideConfigBuilder::validate`].
#[derive(Debug)]
pub enum Validation {
    Valid,
    Invalid { template_id: String, reason: Error },
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn reason(&self) -> Option<&Error> {
        match self {
            Self::Valid => None,
            Self::Invalid { reason, .. } => Some(reason),
        }
    }
}

impl<'d> SlideConfigBuilder<'d> {
    pub fn new(definitions: &'d Definitions) -> Self {
        Self { definitions }
    }

    pub fn definitions(&self) -> &'d Definitions {
        self.definitions
    }

    /// Builds the render config for the given template. Either the complete
    /// config is returned or the first error encountered.
    pub fn build(
        &self,
        template_id: &str,
        context: &PresentationContext,
    ) -> Result<SlideRenderConfig, Error> {
        let template = self.template(template_id)?;
        let data = self.transform_data(template, context)?;

        let texts = self.definitions.texts();
        let vars = context.variables();
        let (theme, function) = (template.theme_key.as_str(), template.function_key.as_str());
        let title = texts.render(theme, function, TextField::Title, vars, 0)?;
        let has_caption = texts
            .get(theme, function)
            .map_or(false, |p| p.has_caption());
        let caption = if has_caption {
            Some(texts.render(theme, function, TextField::Caption, vars, 0)?)
        } else {
            None
        };
        let summary = texts.render(
            theme,
            function,
            TextField::Summary,
            vars,
            template.summary_variant,
        )?;

        let style = self
            .definitions
            .styles()
            .resolve(template.layout_type, template.style_profile.as_deref())?;

        debug!(
            "Built slide config for template {} ({} data roles)",
            template_id,
            data.len()
        );
        Ok(SlideRenderConfig {
            template_id: template.id.clone(),
            layout_type: template.layout_type,
            style,
            title,
            caption,
            summary,
            data,
        })
    }

    /// Pre-flights a build: checks that the template exists, every bound
    /// dataset is present and every transform succeeds. No text is rendered
    /// and no config is assembled.
    pub fn validate(&self, template_id: &str, context: &PresentationContext) -> Validation {
        let result = self
            .template(template_id)
            .and_then(|t| self.transform_data(t, context));
        match result {
            Ok(_) => Validation::Valid,
            Err(reason) => {
                debug!("Template {} failed validation: {}", template_id, reason);
                Validation::Invalid {
                    template_id: template_id.to_string(),
                    reason,
                }
            }
        }
    }

    fn template(&self, template_id: &str) -> Result<&'d TemplateDefinition, Error> {
        self.definitions
            .templates()
            .get(template_id)
            .ok_or_else(|| Error::TemplateNotFound(template_id.to_string()))
    }

    fn transform_data(
        &self,
        template: &TemplateDefinition,
        context: &PresentationContext,
    ) -> Result<Vec<RoleData>, Error> {
        template
            .data
            .iter()
            .map(|binding| {
                let dataset = context.dataset(&binding.dataset).ok_or_else(|| {
                    Error::MissingDataset {
                        role: binding.role.clone(),
                        dataset: binding.dataset.clone(),
                    }
                })?;
                Ok(RoleData {
                    role: binding.role.clone(),
                    dataset: binding.dataset.clone(),
                    data: binding.transform.apply(dataset)?,
                })
            })
            .collect()
    }
}
