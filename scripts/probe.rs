use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Serialize)]
struct Turn {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct AskRequest {
    question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_history: Option<Vec<Turn>>,
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    answer: String,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let base_url = std::env::var("PROBE_URL").unwrap_or_else(|_| "http://127.0.0.1:5000".to_string());
    let question = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "What is the capital of France?".to_string());
    let client = Client::new();

    println!("\n🔎 Probing {}\n", base_url);

    // Ping
    let start = Instant::now();
    let response = client
        .post(format!("{}/ask", base_url))
        .json(&AskRequest {
            question: "ping".to_string(),
            conversation_history: None,
        })
        .send()
        .await;

    match response {
        Ok(resp) if resp.status().is_success() => {
            let body: AskResponse = match resp.json().await {
                Ok(body) => body,
                Err(e) => {
                    println!("❌ Unexpected ping body: {}", e);
                    return;
                }
            };
            println!("✅ ping -> {} ({}ms)", body.answer, start.elapsed().as_millis());
        }
        Ok(resp) => {
            println!("❌ Ping failed with {}: {}", resp.status(), resp.text().await.unwrap_or_default());
            return;
        }
        Err(e) => {
            println!("❌ Request failed: {}. Is the server running?", e);
            return;
        }
    }

    // First question, no history
    let start = Instant::now();
    let response = client
        .post(format!("{}/ask", base_url))
        .json(&AskRequest {
            question: question.clone(),
            conversation_history: None,
        })
        .send()
        .await;

    let (cookie, first_answer) = match response {
        Ok(resp) if resp.status().is_success() => {
            let cookie = resp
                .headers()
                .get(header::SET_COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(';').next())
                .map(str::to_string);
            match resp.json::<AskResponse>().await {
                Ok(body) => (cookie, body.answer),
                Err(e) => {
                    println!("❌ Unexpected answer body: {}", e);
                    return;
                }
            }
        }
        Ok(resp) => {
            println!("❌ Ask failed with {}: {}", resp.status(), resp.text().await.unwrap_or_default());
            return;
        }
        Err(e) => {
            println!("❌ Request failed: {}", e);
            return;
        }
    };

    println!("⏱️  Response time: {}ms", start.elapsed().as_millis());
    println!("📝 {}\n", first_answer);

    // Follow-up in the same session, history includes the new question
    let follow_up = "Can you tell me more?".to_string();
    let history = vec![
        Turn { role: "user".to_string(), content: question },
        Turn { role: "assistant".to_string(), content: first_answer },
        Turn { role: "user".to_string(), content: follow_up.clone() },
    ];

    let mut request = client.post(format!("{}/ask", base_url)).json(&AskRequest {
        question: follow_up,
        conversation_history: Some(history),
    });
    if let Some(cookie) = &cookie {
        request = request.header(header::COOKIE, cookie);
    }

    let start = Instant::now();
    match request.send().await {
        Ok(resp) if resp.status().is_success() => match resp.json::<AskResponse>().await {
            Ok(body) => {
                println!("⏱️  Follow-up time: {}ms", start.elapsed().as_millis());
                println!("📝 {}\n", body.answer);
            }
            Err(e) => println!("❌ Unexpected answer body: {}", e),
        },
        Ok(resp) => println!("❌ Follow-up failed with {}: {}", resp.status(), resp.text().await.unwrap_or_default()),
        Err(e) => println!("❌ Request failed: {}", e),
    }
}
