// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt construction.
//!
//! A fixed Spanish template plus optional per-customer personalization
//! lines. Deployments can replace the template through
//! `agent.system_prompt`; personalization is appended either way.

use std::fmt::Write as _;

use miga_core::Customer;

/// Built-in persona for the bakery assistant.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
Eres un asistente virtual amigable y cordial de la panadería Miga que atiende a los clientes por WhatsApp.

## Tu personalidad
- Siempre eres cordial, amable y profesional
- Respondes en español de manera natural y conversacional
- Usas un tono cálido pero profesional

## Tus capacidades
- Puedes mostrar las categorías y el catálogo de productos con sus precios
- Puedes buscar productos por nombre o descripción
- Puedes mostrar las recetas asociadas a un producto
- Puedes crear pedidos, confirmarlos para enviarlos a la panadería, o cancelarlos mientras estén pendientes
- Puedes consultar la información registrada del cliente

## Sobre las recetas (INFORMACIÓN CONFIDENCIAL)
- Puedes mencionar los NOMBRES de los ingredientes que lleva cada receta
- NUNCA compartas cantidades exactas, proporciones ni el procedimiento detallado de elaboración. Esa información es propiedad de la panadería
- Si el cliente pide cantidades o el paso a paso, responde amablemente que esa información es parte de nuestras fórmulas exclusivas

## Sobre los pedidos
- Un pedido recién creado queda pendiente; confírmalo solo cuando el cliente lo apruebe explícitamente
- Antes de confirmar, repite el resumen del pedido con el total
- Un pedido confirmado ya no puede modificarse ni cancelarse

## Reglas importantes
- NUNCA inventes información, usa siempre las herramientas para consultar
- Si el cliente pregunta por algo que no puedes hacer, explícalo amablemente
- Mantén las respuestas concisas pero completas (WhatsApp tiene límite de caracteres)

## Formato de respuestas
- Usa emojis con moderación para dar calidez 🙂
- Para listas, usa guiones o números
- Para precios, usa el formato $XX.XX";

/// Builds the system instruction for one turn.
///
/// Known customer details are appended so the model can greet by name and
/// suggest favorites without a tool round-trip.
pub fn build_system_prompt(template: Option<&str>, customer: &Customer) -> String {
    let mut prompt = template.unwrap_or(DEFAULT_SYSTEM_PROMPT).to_string();

    let favorites = customer.favorite_products();
    let notes = customer.notes();
    if customer.name.is_some() || !favorites.is_empty() || notes.is_some() {
        prompt.push_str("\n\n## Cliente actual");
        if let Some(name) = &customer.name {
            let _ = write!(prompt, "\n- Nombre: {name}");
        }
        if !favorites.is_empty() {
            let _ = write!(prompt, "\n- Productos favoritos: {}", favorites.join(", "));
        }
        if let Some(notes) = notes {
            let _ = write!(prompt, "\n- Notas: {notes}");
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use miga_core::{CustomerId, PreferenceMap};

    fn customer(name: Option<&str>, preferences: PreferenceMap) -> Customer {
        Customer {
            id: CustomerId("c1".into()),
            phone_number: "5215512345678".into(),
            name: name.map(str::to_string),
            preferences,
            created_at: "2026-08-01T10:00:00Z".into(),
            updated_at: "2026-08-01T10:00:00Z".into(),
        }
    }

    #[test]
    fn anonymous_customer_gets_bare_template() {
        let prompt = build_system_prompt(None, &customer(None, PreferenceMap::new()));
        assert_eq!(prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn known_customer_details_are_appended() {
        let mut preferences = PreferenceMap::new();
        preferences.insert(
            "favorite_products".into(),
            serde_json::json!(["Pan Francés", "Croissant"]),
        );
        preferences.insert("notes".into(), serde_json::json!("retira los sábados"));

        let prompt = build_system_prompt(None, &customer(Some("Ana"), preferences));
        assert!(prompt.contains("## Cliente actual"));
        assert!(prompt.contains("- Nombre: Ana"));
        assert!(prompt.contains("Pan Francés, Croissant"));
        assert!(prompt.contains("retira los sábados"));
    }

    #[test]
    fn configured_template_replaces_the_default() {
        let prompt = build_system_prompt(
            Some("Eres un bot de prueba."),
            &customer(Some("Ana"), PreferenceMap::new()),
        );
        assert!(prompt.starts_with("Eres un bot de prueba."));
        assert!(prompt.contains("- Nombre: Ana"));
        assert!(!prompt.contains("panadería Miga"));
    }
}
