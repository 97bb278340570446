//! Prompt construction for webhook handler generation.

/// System instruction sent with every generation request.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that generates TypeScript code.";

/// Builds the handler-generation prompt around the sampled payload bodies.
///
/// `bodies` is the selected webhook bodies joined with blank lines; the model
/// is asked for a single TypeScript handler with a Zod schema per event type
/// and no markdown fencing around the output.
pub fn handler_prompt(bodies: &str) -> String {
    format!(
        "Generate a TypeScript function that serves as a handler for multiple webhook events. \
         The function should accept a request body containing different webhook events and \
         validate the incoming data using Zod. Each webhook event type should have its own \
         schema defined using Zod.\n\n\
         The function should handle the following webhook events with example payloads:\n\n\
         \"\"\"\n\
         {bodies}\n\
         \"\"\"\n\n\
         The generated code should include:\n\n\
         - A main function that takes the webhook request body as input.\n\
         - Zod schemas for each event type.\n\
         - Logic to handle each event based on the validated data.\n\
         - Appropriate error handling for invalid payloads.\n\n\
         Return only the code and do not return ```typescript or any other markdown symbols, \
         do not include any introduction or text before or after the code."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_payload_bodies() {
        let bodies = "{\"type\":\"payment_intent.succeeded\"}\n\n{\"type\":\"invoice.paid\"}";
        let prompt = handler_prompt(bodies);

        assert!(prompt.contains("payment_intent.succeeded"));
        assert!(prompt.contains("invoice.paid"));
        assert!(prompt.contains("Zod"));
    }

    #[test]
    fn prompt_forbids_markdown_fences() {
        let prompt = handler_prompt("");
        assert!(prompt.contains("do not return ```typescript"));
    }
}
